//! Collision Detection
//!
//! Stateless geometric queries over [`Aabb`]s, rays and segments.
//! Every function is total: malformed input yields an empty result.

use glam::Vec3;

use super::aabb::{Aabb, CollisionResult, Ray};

/// Default reach for ray queries.
pub const DEFAULT_RAY_DISTANCE: f32 = 1000.0;

/// Overlap at or below this is contact, not penetration.
pub const CONTACT_EPSILON: f32 = 1e-4;

/// Segment components below this are treated as parallel to the slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Fraction of the half extent a local hit point must reach to pick that face.
const FACE_THRESHOLD: f32 = 0.95;

/// Check if two boxes overlap (touching counts).
#[inline]
pub fn check_aabb(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

/// Ray vs box using the slab method.
///
/// Misses when the slabs do not overlap, the box is behind the ray, or the
/// entry lies beyond `max_distance`. A ray starting inside the box reports
/// its exit distance.
pub fn raycast_aabb(ray: &Ray, aabb: &Aabb, max_distance: f32) -> CollisionResult {
    if !aabb.is_valid() || ray.direction == Vec3::ZERO {
        return CollisionResult::MISS;
    }

    // Zero direction components become infinities here; the min/max below
    // absorb them.
    let inv_dir = ray.direction.recip();
    let t1 = (aabb.min - ray.origin) * inv_dir;
    let t2 = (aabb.max - ray.origin) * inv_dir;

    let t_near = t1.min(t2).max_element();
    let t_far = t1.max(t2).min_element();

    if t_near > t_far || t_far < 0.0 || t_near > max_distance {
        return CollisionResult::MISS;
    }

    let distance = if t_near >= 0.0 { t_near } else { t_far };
    let point = ray.at(distance);

    CollisionResult {
        collided: true,
        point,
        normal: face_normal(aabb, point),
        distance,
    }
}

/// Single-axis outward normal of the face nearest `point`.
///
/// Axes are tried x, then y, then z; zero if none qualifies.
fn face_normal(aabb: &Aabb, point: Vec3) -> Vec3 {
    let local = point - aabb.center();
    let half = aabb.half_size();

    for axis in 0..3 {
        if local[axis].abs() > half[axis] * FACE_THRESHOLD {
            let mut normal = Vec3::ZERO;
            normal[axis] = if local[axis] > 0.0 { 1.0 } else { -1.0 };
            return normal;
        }
    }
    Vec3::ZERO
}

/// Sweep a moving box along `velocity` for `dt` against a static box.
///
/// Inflates the static box by the mover's half size (Minkowski sum), casts
/// the mover's center through it, then shifts the contact point back off
/// the inflated face along the hit normal.
pub fn sweep_aabb(moving: &Aabb, velocity: Vec3, static_box: &Aabb, dt: f32) -> CollisionResult {
    if !moving.is_valid() || !static_box.is_valid() {
        return CollisionResult::MISS;
    }

    let half = moving.half_size();
    let expanded = static_box.inflated(half);
    let ray = Ray::new(moving.center(), velocity);

    let mut result = raycast_aabb(&ray, &expanded, velocity.length() * dt);
    if result.collided {
        for axis in 0..3 {
            if result.normal[axis].abs() > 0.5 {
                result.point[axis] -= half[axis] * result.normal[axis];
            }
        }
    }
    result
}

/// Per-axis overlap of `a` into `b`.
///
/// Each component is negative when `a`'s center is on the negative side of
/// `b`'s, so adding a component to `a` pushes it out along that axis.
/// Returns zero unless the boxes truly overlap on all three axes.
pub fn aabb_penetration(a: &Aabb, b: &Aabb) -> Vec3 {
    if !a.is_valid() || !b.is_valid() || !a.intersects(b) {
        return Vec3::ZERO;
    }

    let overlap = a.max.min(b.max) - a.min.max(b.min);
    if overlap.min_element() <= CONTACT_EPSILON {
        return Vec3::ZERO;
    }

    let a_center = a.center();
    let b_center = b.center();
    let mut penetration = overlap;
    for axis in 0..3 {
        if a_center[axis] < b_center[axis] {
            penetration[axis] = -overlap[axis];
        }
    }
    penetration
}

/// Minimum translation to push `moving` out of `static_box`.
///
/// Picks the single axis with the smallest penetration; ties go x, y, z.
pub fn resolve_aabb_collision(moving: &Aabb, static_box: &Aabb) -> Vec3 {
    let penetration = aabb_penetration(moving, static_box);
    if penetration == Vec3::ZERO {
        return Vec3::ZERO;
    }

    let mut best_axis = None;
    let mut best_depth = f32::MAX;
    for axis in 0..3 {
        let depth = penetration[axis].abs();
        if depth > 0.0 && depth < best_depth {
            best_depth = depth;
            best_axis = Some(axis);
        }
    }

    let mut resolution = Vec3::ZERO;
    if let Some(axis) = best_axis {
        resolution[axis] = penetration[axis];
    }
    resolution
}

/// Segment vs box slab test, `t` clipped to `[0, 1]`.
///
/// Returns the entry fraction along `start -> end`, or `0.0` when `start`
/// is already inside. Near-zero axes fall back to a containment check.
pub fn segment_hit_fraction(start: Vec3, end: Vec3, aabb: &Aabb) -> Option<f32> {
    if !aabb.is_valid() {
        return None;
    }

    let delta = end - start;
    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;

    for axis in 0..3 {
        if delta[axis].abs() < PARALLEL_EPSILON {
            if start[axis] < aabb.min[axis] || start[axis] > aabb.max[axis] {
                return None;
            }
        } else {
            let inv = 1.0 / delta[axis];
            let mut t1 = (aabb.min[axis] - start[axis]) * inv;
            let mut t2 = (aabb.max[axis] - start[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

/// Check if the segment `start -> end` touches the box.
#[inline]
pub fn segment_intersects_aabb(start: Vec3, end: Vec3, aabb: &Aabb) -> bool {
    segment_hit_fraction(start, end, aabb).is_some()
}
