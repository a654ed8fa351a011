//! Game Logic Module
//!
//! Everything above raw geometry: the level, the agents moving through it,
//! and the tick that advances them together.
//!
//! ## Module Structure
//!
//! - `config`: Tuning for player, enemies, weapon and stepping
//! - `map`: Brushes, entities and lights loaded from JSON
//! - `input`: Per-tick button state and view basis
//! - `view`: FOV, camera height, head bob and shake
//! - `player`: Movement controller with momentum, slide and step-up
//! - `enemy`: Chasing melee agents and their roster
//! - `weapon`: Bullets and swept hit resolution
//! - `events`: Game events for logging and replay checks
//! - `state`: World state and hashing
//! - `tick`: Simulation loop and replay

pub mod config;
pub mod enemy;
pub mod events;
pub mod input;
pub mod map;
pub mod player;
pub mod state;
pub mod tick;
pub mod view;
pub mod weapon;

// Re-export key types
pub use config::{
    ConfigError, EnemyConfig, GameConfig, PlayerConfig, SimulationConfig, WeaponConfig,
};
pub use enemy::{Enemy, EnemyManager, EnemyState};
pub use events::{GameEvent, GameEventData};
pub use input::{InputFrame, ViewBasis};
pub use map::{Brush, Entity, EntityType, Map, MapError, SurfaceType};
pub use player::{Player, PlayerState, Stance};
pub use state::WorldState;
pub use tick::{replay, replay_hash, tick, TickResult};
pub use weapon::{Bullet, DamageTarget, ShotOutcome, TargetHit, Weapon};
