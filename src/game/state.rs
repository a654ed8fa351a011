//! World State
//!
//! Everything that changes while a room is played: the player, the enemy
//! roster, bullets in flight and the event log. The map is not owned here;
//! it is borrowed by each tick so one loaded map can back many sessions.

use glam::Vec3;

use crate::core::hash::{compute_state_hash, StateHash, StateHasher};
use crate::game::config::GameConfig;
use crate::game::enemy::EnemyManager;
use crate::game::events::GameEvent;
use crate::game::map::Map;
use crate::game::player::Player;
use crate::game::weapon::Weapon;

/// Complete mutable state of one session.
#[derive(Clone, Debug)]
pub struct WorldState {
    /// Ticks simulated so far
    pub tick: u32,
    /// The local player
    pub player: Player,
    /// Enemy roster
    pub enemies: EnemyManager,
    /// Weapon and bullets in flight
    pub weapon: Weapon,
    /// Where the player (re)spawns
    pub spawn_point: Vec3,
    /// Enemies killed since the room was (re)populated
    pub kills: u32,
    /// Every enemy in the room has been killed
    pub room_cleared: bool,
    /// Seed for view noise (for verification)
    pub rng_seed: u64,
    config: GameConfig,
    pending_events: Vec<GameEvent>,
}

impl WorldState {
    /// Fresh session. With a map, the player starts at its player start
    /// and the roster is filled from its enemy spawns.
    pub fn new(map: Option<&Map>, config: &GameConfig) -> Self {
        let spawn_point = spawn_point(map, config);
        let mut state = Self {
            tick: 0,
            player: Player::new(spawn_point, &config.player, config.simulation.rng_seed),
            enemies: EnemyManager::new(&config.enemy),
            weapon: Weapon::new(&config.weapon),
            spawn_point,
            kills: 0,
            room_cleared: false,
            rng_seed: config.simulation.rng_seed,
            config: config.clone(),
            pending_events: Vec::new(),
        };

        if let Some(map) = map {
            state.populate(map);
        }
        state
    }

    /// Configuration this session was built with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Refill the roster from `map` and reopen the room.
    pub fn populate(&mut self, map: &Map) {
        let count = self.enemies.spawn_from_map(map);
        self.kills = 0;
        self.room_cleared = false;
        self.push_event(GameEvent::enemies_spawned(self.tick, count));
    }

    /// Put the player back at the spawn point with a fresh room.
    pub fn respawn(&mut self, map: Option<&Map>) {
        self.player.respawn(self.spawn_point);
        self.weapon.clear();
        match map {
            Some(map) => self.populate(map),
            None => {
                self.enemies.clear();
                self.kills = 0;
                self.room_cleared = false;
            }
        }
        self.push_event(GameEvent::player_respawned(self.tick, self.spawn_point));
    }

    /// Compute hash of current state for verification.
    ///
    /// Covers simulation state only; view effects are excluded.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            self.hash_player(hasher);

            hasher.update_u32(self.enemies.enemies().len() as u32);
            for enemy in self.enemies.enemies() {
                hasher.update_u32(enemy.id);
                hasher.update_vec3(enemy.position);
                hasher.update_f32(enemy.velocity_y);
                hasher.update_bool(enemy.on_ground);
                hasher.update_i32(enemy.hp);
                hasher.update_u8(enemy.state() as u8);
            }

            hasher.update_u32(self.weapon.bullets().len() as u32);
            for bullet in self.weapon.bullets() {
                hasher.update_vec3(bullet.position);
                hasher.update_vec3(bullet.velocity);
                hasher.update_f32(bullet.lifetime);
            }
            hasher.update_f32(self.weapon.cooldown());

            hasher.update_u32(self.kills);
            hasher.update_bool(self.room_cleared);
        })
    }

    fn hash_player(&self, hasher: &mut StateHasher) {
        let player = &self.player;
        hasher.update_vec3(player.position);
        hasher.update_vec3(player.velocity);
        hasher.update_vec3(player.momentum);
        hasher.update_bool(player.on_ground);
        hasher.update_f32(player.hp);
        hasher.update_u8(player.state() as u8);
        hasher.update_bool(player.is_sprinting());
        hasher.update_bool(player.is_god_mode());
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

/// The map's player start, or the configured default.
fn spawn_point(map: Option<&Map>, config: &GameConfig) -> Vec3 {
    map.and_then(Map::player_start)
        .map(|start| start.position)
        .unwrap_or(config.simulation.default_spawn)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::map::{Entity, EntityType};

    fn arena() -> Map {
        let mut map = Map::default();
        map.add_entity(Entity::new(EntityType::PlayerStart, Vec3::new(1.0, 2.0, 3.0)));
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(5.0, 2.0, 0.0)));
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(-5.0, 2.0, 0.0)));
        map
    }

    #[test]
    fn test_new_uses_player_start_and_spawns() {
        let map = arena();
        let mut state = WorldState::new(Some(&map), &GameConfig::default());

        assert_eq!(state.player.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.enemies.live_count(), 2);

        let events = state.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, GameEventData::EnemiesSpawned { count: 2 });
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_new_without_map_uses_default_spawn() {
        let config = GameConfig::default();
        let state = WorldState::new(None, &config);
        assert_eq!(state.player.position, config.simulation.default_spawn);
        assert_eq!(state.enemies.spawned_count(), 0);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let map = arena();
        let config = GameConfig::default();
        let a = WorldState::new(Some(&map), &config);
        let b = WorldState::new(Some(&map), &config);
        assert_eq!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_hash_changes_with_state() {
        let map = arena();
        let mut state = WorldState::new(Some(&map), &GameConfig::default());
        let before = state.compute_hash();

        state.player.momentum.x = 1.0;
        assert_ne!(state.compute_hash(), before);
    }

    #[test]
    fn test_respawn_resets_room() {
        let map = arena();
        let mut state = WorldState::new(Some(&map), &GameConfig::default());
        state.take_events();

        state.player.take_damage(1000.0);
        state.kills = 2;
        state.room_cleared = true;
        state.respawn(Some(&map));

        assert!(!state.player.is_dead());
        assert_eq!(state.kills, 0);
        assert!(!state.room_cleared);
        assert_eq!(state.enemies.live_count(), 2);

        let events = state.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::PlayerRespawned { .. })));
    }
}
