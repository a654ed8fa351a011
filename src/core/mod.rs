//! Core geometric and deterministic primitives.
//!
//! Everything here is stateless or self-contained: box and ray types,
//! the collision query library, the seeded RNG and the state hasher.

pub mod aabb;
pub mod collision;
pub mod hash;
pub mod rng;

// Re-export core types
pub use aabb::{Aabb, CollisionResult, Ray};
pub use collision::{
    aabb_penetration, check_aabb, raycast_aabb, resolve_aabb_collision, segment_hit_fraction,
    segment_intersects_aabb, sweep_aabb, DEFAULT_RAY_DISTANCE,
};
pub use hash::{compute_state_hash, StateHash, StateHasher};
pub use rng::DeterministicRng;
