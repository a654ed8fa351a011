//! Game Events
//!
//! Events generated during simulation for logging and replay checks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Player death and respawn first
    PlayerLife = 0,
    /// Then kills
    Kill = 1,
    /// Then damage and hits
    Damage = 2,
    /// Then projectile bookkeeping
    Projectile = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Enemy roster (re)spawned from the map
    EnemiesSpawned {
        count: u32,
    },

    /// Bullet left the muzzle
    BulletFired {
        origin: Vec3,
        direction: Vec3,
    },

    /// Bullet hit level geometry
    BulletHitWorld {
        point: Vec3,
    },

    /// Bullet hit an enemy that survived
    EnemyHit {
        enemy_id: u32,
        point: Vec3,
        hp_left: i32,
    },

    /// Bullet killed an enemy
    EnemyKilled {
        enemy_id: u32,
        point: Vec3,
    },

    /// Bullet ran out of lifetime
    BulletExpired {
        position: Vec3,
    },

    /// Touching enemies hurt the player this tick
    PlayerDamaged {
        amount: f32,
        hp_left: f32,
    },

    /// Player health reached zero
    PlayerDied {
        position: Vec3,
    },

    /// Player was put back at the spawn point
    PlayerRespawned {
        position: Vec3,
    },

    /// Every spawned enemy is dead
    RoomCleared {
        kills: u32,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Enemy involved (for tie-breaking)
    pub enemy_id: Option<u32>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let enemy_id = match &data {
            GameEventData::EnemyHit { enemy_id, .. } => Some(*enemy_id),
            GameEventData::EnemyKilled { enemy_id, .. } => Some(*enemy_id),
            _ => None,
        };

        Self {
            tick,
            priority,
            enemy_id,
            data,
        }
    }

    /// Create enemies spawned event.
    pub fn enemies_spawned(tick: u32, count: u32) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::EnemiesSpawned { count })
    }

    /// Create bullet fired event.
    pub fn bullet_fired(tick: u32, origin: Vec3, direction: Vec3) -> Self {
        Self::new(
            tick,
            EventPriority::Projectile,
            GameEventData::BulletFired { origin, direction },
        )
    }

    /// Create bullet hit world event.
    pub fn bullet_hit_world(tick: u32, point: Vec3) -> Self {
        Self::new(tick, EventPriority::Projectile, GameEventData::BulletHitWorld { point })
    }

    /// Create enemy hit event.
    pub fn enemy_hit(tick: u32, enemy_id: u32, point: Vec3, hp_left: i32) -> Self {
        Self::new(
            tick,
            EventPriority::Damage,
            GameEventData::EnemyHit {
                enemy_id,
                point,
                hp_left,
            },
        )
    }

    /// Create enemy killed event.
    pub fn enemy_killed(tick: u32, enemy_id: u32, point: Vec3) -> Self {
        Self::new(tick, EventPriority::Kill, GameEventData::EnemyKilled { enemy_id, point })
    }

    /// Create bullet expired event.
    pub fn bullet_expired(tick: u32, position: Vec3) -> Self {
        Self::new(tick, EventPriority::Projectile, GameEventData::BulletExpired { position })
    }

    /// Create player damaged event.
    pub fn player_damaged(tick: u32, amount: f32, hp_left: f32) -> Self {
        Self::new(
            tick,
            EventPriority::Damage,
            GameEventData::PlayerDamaged { amount, hp_left },
        )
    }

    /// Create player died event.
    pub fn player_died(tick: u32, position: Vec3) -> Self {
        Self::new(tick, EventPriority::PlayerLife, GameEventData::PlayerDied { position })
    }

    /// Create player respawned event.
    pub fn player_respawned(tick: u32, position: Vec3) -> Self {
        Self::new(tick, EventPriority::PlayerLife, GameEventData::PlayerRespawned { position })
    }

    /// Create room cleared event.
    pub fn room_cleared(tick: u32, kills: u32) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::RoomCleared { kills })
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.enemy_id == other.enemy_id
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then enemy_id
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.enemy_id.cmp(&other.enemy_id))
    }
}
