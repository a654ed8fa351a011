//! Enemy Agents
//!
//! Box-shaped melee chasers. Each enemy falls under gravity, rests on the
//! highest brush beneath it, and walks straight at the player once the
//! player is within aggro range. Walls stop the blocked axis only, so an
//! enemy slides along a wall rather than sticking to it.
//!
//! [`EnemyManager`] owns the roster for one room and answers bullet hits
//! through [`DamageTarget`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::aabb::Aabb;
use crate::core::collision::segment_hit_fraction;
use crate::game::config::EnemyConfig;
use crate::game::map::{EntityType, Map};
use crate::game::weapon::{DamageTarget, TargetHit};

/// Players closer than this horizontally are not chased any further.
const ARRIVE_DISTANCE: f32 = 0.01;

/// Extra probe depth below the resting gap.
const PROBE_SLACK: f32 = 0.01;

/// Only surfaces at most this far above the feet count as ground.
const SUPPORT_TOLERANCE: f32 = 0.1;

/// Enemy behaviour state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Player out of range
    #[default]
    Idle,
    /// Moving toward the player
    Chasing,
    /// Out of hit points; inert until removed
    Dead,
}

/// A single enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Roster-unique id
    pub id: u32,
    /// Feet position (bottom center of the box)
    pub position: Vec3,
    /// Vertical velocity
    pub velocity_y: f32,
    /// Standing on a brush
    pub on_ground: bool,
    /// Remaining hit points
    pub hp: i32,
    max_hp: i32,
    state: EnemyState,
}

impl Enemy {
    /// Spawn at `position` with full health.
    pub fn new(id: u32, position: Vec3, config: &EnemyConfig) -> Self {
        Self {
            id,
            position,
            velocity_y: 0.0,
            on_ground: false,
            hp: config.max_hp,
            max_hp: config.max_hp,
            state: EnemyState::Idle,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Hit points at spawn.
    #[inline]
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Check if dead.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    /// Collision box: feet-anchored, `width` square, `height` tall.
    pub fn aabb(&self, config: &EnemyConfig) -> Aabb {
        let half_width = config.width * 0.5;
        Aabb::new(
            self.position - Vec3::new(half_width, 0.0, half_width),
            self.position + Vec3::new(half_width, config.height, half_width),
        )
    }

    /// Within melee range of the player (horizontal distance).
    pub fn is_touching_player(&self, player_position: Vec3, config: &EnemyConfig) -> bool {
        !self.is_dead() && horizontal_distance(self.position, player_position) < config.touch_range
    }

    /// Apply damage. Returns true if this hit killed the enemy.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }

        self.hp -= amount.max(0);
        if self.hp <= 0 {
            self.hp = 0;
            self.state = EnemyState::Dead;
            return true;
        }
        false
    }

    /// Advance one tick: gravity and ground, then chase.
    pub fn update(
        &mut self,
        dt: f32,
        player_position: Vec3,
        map: Option<&Map>,
        config: &EnemyConfig,
    ) {
        if self.is_dead() {
            return;
        }

        let boxes: Vec<Aabb> = map.map(|m| m.brush_boxes().collect()).unwrap_or_default();
        self.apply_gravity(dt, &boxes, config);

        let dist = horizontal_distance(self.position, player_position);
        if dist < config.aggro_range {
            self.state = EnemyState::Chasing;
            if dist >= ARRIVE_DISTANCE {
                let to_player = Vec3::new(
                    player_position.x - self.position.x,
                    0.0,
                    player_position.z - self.position.z,
                );
                let desired = to_player / dist * config.move_speed * dt;
                let actual = self.resolve_horizontal(desired, &boxes, config);
                self.position.x += actual.x;
                self.position.z += actual.z;
            }
        } else {
            self.state = EnemyState::Idle;
        }
    }

    fn apply_gravity(&mut self, dt: f32, boxes: &[Aabb], config: &EnemyConfig) {
        self.on_ground = self.support_top(boxes, self.position.y, config).is_some();
        if self.on_ground {
            self.velocity_y = 0.0;
        } else {
            self.velocity_y = (self.velocity_y + config.gravity * dt).max(config.max_fall_speed);
        }

        let start_y = self.position.y;
        self.position.y += self.velocity_y * dt;

        if self.velocity_y <= 0.0 {
            // Probe spans the whole drop so fast falls cannot skip a floor
            if let Some(top) = self.support_top(boxes, start_y, config) {
                self.position.y = top + config.ground_epsilon;
                self.velocity_y = 0.0;
                self.on_ground = true;
            }
        }
    }

    /// Highest brush top between the current feet and `from_y`.
    fn support_top(&self, boxes: &[Aabb], from_y: f32, config: &EnemyConfig) -> Option<f32> {
        let half_width = config.width * 0.5;
        let probe = Aabb::new(
            Vec3::new(
                self.position.x - half_width,
                self.position.y - config.ground_epsilon - PROBE_SLACK,
                self.position.z - half_width,
            ),
            Vec3::new(self.position.x + half_width, from_y, self.position.z + half_width),
        );

        let limit = from_y + SUPPORT_TOLERANCE;
        boxes
            .iter()
            .filter(|b| probe.intersects(b) && b.max.y <= limit)
            .map(|b| b.max.y)
            .reduce(f32::max)
    }

    /// X then Z; a blocked axis is zeroed. Flat brushes never block.
    fn resolve_horizontal(&self, desired: Vec3, boxes: &[Aabb], config: &EnemyConfig) -> Vec3 {
        let mut result = desired;
        let mut current = self.aabb(config);

        for axis in [0, 2] {
            let mut step = Vec3::ZERO;
            step[axis] = desired[axis];
            let moved = current.translated(step);

            let blocked = boxes
                .iter()
                .filter(|b| b.size().y >= config.wall_thickness_epsilon)
                .any(|b| moved.intersects(b));

            if blocked {
                result[axis] = 0.0;
            } else {
                current = moved;
            }
        }

        result
    }
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

// =============================================================================
// MANAGER
// =============================================================================

/// Enemy roster for the current room.
#[derive(Clone, Debug)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    spawned: u32,
    next_id: u32,
    config: EnemyConfig,
}

impl EnemyManager {
    /// Empty roster.
    pub fn new(config: &EnemyConfig) -> Self {
        Self {
            enemies: Vec::new(),
            spawned: 0,
            next_id: 0,
            config: config.clone(),
        }
    }

    /// Enemy tuning in use.
    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Replace the roster with one enemy per spawn entity in `map`.
    ///
    /// Returns the number spawned.
    pub fn spawn_from_map(&mut self, map: &Map) -> u32 {
        self.clear();
        for entity in map.entities_by_type(EntityType::EnemySpawn) {
            let id = self.spawn(entity.position);
            debug!(
                id,
                x = entity.position.x,
                y = entity.position.y,
                z = entity.position.z,
                "Enemy spawned"
            );
        }
        info!(count = self.spawned, "Enemies spawned");
        self.spawned
    }

    /// Add one enemy. Returns its id.
    pub fn spawn(&mut self, position: Vec3) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.spawned += 1;
        self.enemies.push(Enemy::new(id, position, &self.config));
        id
    }

    /// Advance every live enemy.
    pub fn update(&mut self, dt: f32, player_position: Vec3, map: Option<&Map>) {
        for enemy in &mut self.enemies {
            enemy.update(dt, player_position, map, &self.config);
        }
    }

    /// Drop dead enemies. Returns how many were removed.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| !e.is_dead());
        before - self.enemies.len()
    }

    /// Total damage per second from every enemy touching the player.
    pub fn contact_dps(&self, player_position: Vec3) -> f32 {
        let touching = self
            .enemies
            .iter()
            .filter(|e| e.is_touching_player(player_position, &self.config))
            .count();
        touching as f32 * self.config.contact_dps
    }

    /// Live enemies.
    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }

    /// Enemies spawned since the last clear.
    pub fn spawned_count(&self) -> u32 {
        self.spawned
    }

    /// The room had enemies and every one of them is dead.
    pub fn all_dead(&self) -> bool {
        self.spawned > 0 && self.live_count() == 0
    }

    /// Feet positions of live enemies.
    pub fn positions(&self) -> Vec<Vec3> {
        self.enemies
            .iter()
            .filter(|e| !e.is_dead())
            .map(|e| e.position)
            .collect()
    }

    /// Current roster, including enemies killed since the last purge.
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.spawned = 0;
        self.next_id = 0;
    }
}

impl DamageTarget for EnemyManager {
    /// Damage the first live enemy (in roster order) the segment passes through.
    fn segment_hit(&mut self, start: Vec3, end: Vec3, damage: i32) -> Option<TargetHit> {
        let config = &self.config;
        let (enemy, fraction) = self.enemies.iter_mut().filter(|e| !e.is_dead()).find_map(|e| {
            let aabb = e.aabb(config);
            segment_hit_fraction(start, end, &aabb).map(|t| (e, t))
        })?;

        let killed = enemy.take_damage(damage);
        Some(TargetHit {
            target_id: enemy.id,
            point: start + (end - start) * fraction,
            killed,
            hp_left: enemy.hp,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
