//! # Brushfire
//!
//! Collision and movement simulation for a brush-based first-person shooter.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BRUSHFIRE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Geometry and deterministic primitives     │
//! │  ├── aabb.rs     - Boxes, rays, collision results            │
//! │  ├── collision.rs- Overlap, raycast, sweep, resolve, segment │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Simulation                                │
//! │  ├── config.rs   - Tuning (JSON, defaults for every field)   │
//! │  ├── map.rs      - Brushes, entities, lights                 │
//! │  ├── input.rs    - Per-tick buttons and view basis           │
//! │  ├── view.rs     - FOV, camera height, bob and shake         │
//! │  ├── player.rs   - Movement controller                       │
//! │  ├── enemy.rs    - Enemy agents and roster                   │
//! │  ├── weapon.rs   - Bullets and hit resolution                │
//! │  ├── events.rs   - Game events                               │
//! │  ├── state.rs    - World state                               │
//! │  └── tick.rs     - Simulation loop and replay                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Data Flow
//!
//! input → player movement (per-axis collision against brushes) → fire →
//! enemies chase the committed player position → contact damage →
//! bullets swept against brushes, then enemies → room clear → respawn.
//!
//! ## Determinism
//!
//! The simulation is single-threaded and uses no wall clock. Given the
//! same map, config, input frames and timesteps, two runs produce the
//! same state hash on the same build.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::aabb::{Aabb, CollisionResult, Ray};
pub use core::hash::StateHash;
pub use core::rng::DeterministicRng;
pub use game::config::GameConfig;
pub use game::input::InputFrame;
pub use game::map::Map;
pub use game::state::WorldState;
pub use game::tick::{tick, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest timestep a single tick integrates (seconds)
pub const DEFAULT_MAX_DT: f32 = 0.05;

/// Nominal frame time used by the demo binary and benchmarks (seconds)
pub const NOMINAL_DT: f32 = 1.0 / 60.0;
