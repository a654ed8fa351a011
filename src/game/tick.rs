//! Simulation Tick
//!
//! One call advances the whole world by a single variable timestep:
//!
//! 1. Player input and movement
//! 2. Weapon fire
//! 3. Enemy movement
//! 4. Contact damage to the player
//! 5. Bullets against the world and enemies
//! 6. Dead enemy removal and room clear
//! 7. Player death and respawn
//!
//! `dt` is clamped to `[0, max_dt]` before anything integrates, so a long
//! frame hitch never produces a step large enough to tunnel through brushes.

use tracing::{debug, info};

use crate::core::hash::StateHash;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::map::Map;
use crate::game::state::WorldState;
use crate::game::weapon::ShotOutcome;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in processing order
    pub events: Vec<GameEvent>,
    /// The room was cleared this tick
    pub room_cleared: bool,
    /// The player died (and was respawned) this tick
    pub player_died: bool,
}

/// Clamp a frame time to a usable timestep. Non-finite input becomes zero.
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, max_dt.max(0.0))
    } else {
        0.0
    }
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - World state (will be mutated)
/// * `map` - Level geometry; `None` means open space with no ground
/// * `input` - This tick's buttons and look direction
/// * `dt` - Frame time in seconds, clamped to `max_dt`
pub fn tick(state: &mut WorldState, map: Option<&Map>, input: &InputFrame, dt: f32) -> TickResult {
    let mut result = TickResult::default();
    let dt = clamp_dt(dt, state.config().simulation.max_dt);

    // 0. Advance tick counter
    state.tick += 1;
    let now = state.tick;

    // 1. Player
    state.player.update(input, dt, map);

    // 2. Fire
    if input.held(InputFrame::FIRE) {
        let eye = state.player.eye_position() + state.player.camera_offset();
        let shot = state
            .weapon
            .fire(eye, &input.basis())
            .map(|bullet| (bullet.position, bullet.direction));
        if let Some((origin, direction)) = shot {
            state.push_event(GameEvent::bullet_fired(now, origin, direction));
        }
    }

    // 3. Enemies chase the player's committed position
    let player_position = state.player.position;
    state.enemies.update(dt, player_position, map);

    // 4. Contact damage
    let damage = state.enemies.contact_dps(player_position) * dt;
    if damage > 0.0 {
        state.player.take_damage(damage);
        let hp_left = state.player.hp;
        state.push_event(GameEvent::player_damaged(now, damage, hp_left));
    }

    // 5. Bullets
    process_bullets(state, map, dt);

    // 6. Cleanup and room clear
    state.enemies.purge_dead();
    if !state.room_cleared && state.enemies.all_dead() {
        state.room_cleared = true;
        result.room_cleared = true;
        info!(tick = now, kills = state.kills, "Room cleared");
        let kills = state.kills;
        state.push_event(GameEvent::room_cleared(now, kills));
    }

    // 7. Death
    if state.player.is_dead() {
        result.player_died = true;
        info!(tick = now, "Player died");
        let position = state.player.position;
        state.push_event(GameEvent::player_died(now, position));
        state.respawn(map);
    }

    result.events = state.take_events();
    result.events.sort();
    result
}

fn process_bullets(state: &mut WorldState, map: Option<&Map>, dt: f32) {
    let now = state.tick;
    let outcomes = state.weapon.update(dt, map, Some(&mut state.enemies));

    for outcome in outcomes {
        match outcome {
            ShotOutcome::HitWorld { point } => {
                state.push_event(GameEvent::bullet_hit_world(now, point));
            }
            ShotOutcome::HitTarget(hit) if hit.killed => {
                state.kills += 1;
                debug!(enemy = hit.target_id, "Enemy killed");
                state.push_event(GameEvent::enemy_killed(now, hit.target_id, hit.point));
            }
            ShotOutcome::HitTarget(hit) => {
                state.push_event(GameEvent::enemy_hit(now, hit.target_id, hit.point, hit.hp_left));
            }
            ShotOutcome::Expired { position } => {
                state.push_event(GameEvent::bullet_expired(now, position));
            }
        }
    }
}

/// Replay recorded inputs from a fresh session at a fixed timestep.
///
/// Returns the final state and every event generated.
pub fn replay(
    map: Option<&Map>,
    config: &GameConfig,
    inputs: &[InputFrame],
    dt: f32,
) -> (WorldState, Vec<GameEvent>) {
    let mut state = WorldState::new(map, config);
    let mut all_events = state.take_events();

    for input in inputs {
        let result = tick(&mut state, map, input, dt);
        all_events.extend(result.events);
    }

    (state, all_events)
}

/// Final state hash of a replay.
pub fn replay_hash(
    map: Option<&Map>,
    config: &GameConfig,
    inputs: &[InputFrame],
    dt: f32,
) -> StateHash {
    replay(map, config, inputs, dt).0.compute_hash()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::map::{Brush, Entity, EntityType};
    use glam::Vec3;

    const DT: f32 = 0.016;

    /// Floor slab with its top at y = 1, player start above it.
    fn arena() -> Map {
        let mut map = Map::default();
        map.add_brush(Brush::cuboid(
            1,
            Vec3::new(-40.0, 0.0, -40.0),
            Vec3::new(40.0, 1.0, 40.0),
            "floor",
        ));
        map.add_entity(Entity::new(EntityType::PlayerStart, Vec3::new(0.0, 10.0, 0.0)));
        map
    }

    fn run(state: &mut WorldState, map: &Map, input: InputFrame, ticks: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(tick(state, Some(map), &input, DT).events);
        }
        events
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.2, 0.05), 0.05);
        assert_eq!(clamp_dt(-1.0, 0.05), 0.0);
        assert_eq!(clamp_dt(f32::NAN, 0.05), 0.0);
        assert_eq!(clamp_dt(f32::INFINITY, 0.05), 0.0);
        assert_eq!(clamp_dt(0.016, 0.05), 0.016);
    }

    #[test]
    fn test_player_settles_on_floor() {
        let map = arena();
        let mut state = WorldState::new(Some(&map), &GameConfig::default());

        run(&mut state, &map, InputFrame::new(), 300);
        assert!(state.player.on_ground);
        assert!((state.player.position.y - 1.0).abs() < 0.05);
        assert_eq!(state.tick, 300);
    }

    #[test]
    fn test_huge_dt_is_capped() {
        let map = arena();
        let mut state = WorldState::new(Some(&map), &GameConfig::default());

        // A ten second hitch integrates as 50ms
        tick(&mut state, Some(&map), &InputFrame::new(), 10.0);
        assert!(state.player.position.y > 9.9);
    }

    #[test]
    fn test_enemy_aggro_range() {
        let mut map = arena();
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(20.0, 1.05, 0.0)));
        let mut state = WorldState::new(Some(&map), &GameConfig::default());
        state.player.respawn(Vec3::new(0.0, 1.01, 0.0));

        run(&mut state, &map, InputFrame::new(), 1);
        assert_eq!(state.enemies.enemies()[0].state(), crate::game::enemy::EnemyState::Idle);

        state.player.respawn(Vec3::new(10.0, 1.01, 0.0));
        run(&mut state, &map, InputFrame::new(), 1);
        assert_eq!(state.enemies.enemies()[0].state(), crate::game::enemy::EnemyState::Chasing);
    }

    #[test]
    fn test_contact_damage_kills_and_respawns() {
        let mut map = arena();
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(0.5, 1.05, 0.0)));
        let config = GameConfig::default();
        let mut state = WorldState::new(Some(&map), &config);
        state.player.respawn(Vec3::new(0.0, 1.01, 0.0));

        let events = run(&mut state, &map, InputFrame::new(), 20);
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::PlayerDamaged { .. })));
        assert!(state.player.hp < config.player.max_hp);

        state.player.hp = 0.1;
        let result = tick(&mut state, Some(&map), &InputFrame::new(), DT);
        assert!(result.player_died);
        assert_eq!(state.player.hp, config.player.max_hp);
        assert_eq!(state.player.position, state.spawn_point);
        assert!(matches!(result.events[0].data, GameEventData::PlayerDied { .. }));
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::PlayerRespawned { .. })));
    }

    #[test]
    fn test_shooting_clears_room() {
        let mut map = arena();
        // Straight down the default look direction, out of aggro range
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(0.2, 1.05, -30.0)));
        let config = GameConfig::default();
        let mut state = WorldState::new(Some(&map), &config);

        run(&mut state, &map, InputFrame::new(), 200);
        assert!(state.player.on_ground);

        let fire = InputFrame::with_buttons(InputFrame::FIRE);
        let mut events = Vec::new();
        let mut cleared = false;
        for _ in 0..120 {
            let result = tick(&mut state, Some(&map), &fire, DT);
            cleared |= result.room_cleared;
            events.extend(result.events);
        }

        assert!(cleared);
        assert!(state.room_cleared);
        assert_eq!(state.kills, 1);
        assert_eq!(state.enemies.live_count(), 0);

        let kills = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::RoomCleared { kills: 1 })));
    }

    #[test]
    fn test_replay_hash_is_deterministic() {
        let mut map = arena();
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(4.0, 1.05, -8.0)));
        let config = GameConfig::default();

        let mut inputs = Vec::new();
        for i in 0..240u32 {
            let mut buttons = InputFrame::FORWARD;
            if i % 40 == 0 {
                buttons |= InputFrame::JUMP;
            }
            if i % 3 == 0 {
                buttons |= InputFrame::FIRE;
            }
            if i == 100 {
                buttons |= InputFrame::SPRINT;
            }
            let look = Vec3::new((i as f32 * 0.05).sin(), -0.1, -1.0);
            inputs.push(InputFrame::with_buttons(buttons).looking(look));
        }

        let a = replay_hash(Some(&map), &config, &inputs, DT);
        let b = replay_hash(Some(&map), &config, &inputs, DT);
        assert_eq!(a, b);

        let (_, events_a) = replay(Some(&map), &config, &inputs, DT);
        let (_, events_b) = replay(Some(&map), &config, &inputs, DT);
        assert_eq!(events_a.len(), events_b.len());

        // A different input stream diverges
        let mut altered = inputs.clone();
        altered[10] = InputFrame::with_buttons(InputFrame::BACK);
        assert_ne!(a, replay_hash(Some(&map), &config, &altered, DT));
    }

    #[test]
    fn test_events_sorted_within_tick() {
        let mut map = arena();
        map.add_entity(Entity::new(EntityType::EnemySpawn, Vec3::new(0.5, 1.05, 0.0)));
        let mut state = WorldState::new(Some(&map), &GameConfig::default());
        state.player.respawn(Vec3::new(0.0, 1.01, 0.0));
        state.player.hp = 0.1;

        let result = tick(&mut state, Some(&map), &InputFrame::with_buttons(InputFrame::FIRE), DT);
        let priorities: Vec<_> = result.events.iter().map(|e| e.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }
}
