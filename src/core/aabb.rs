//! Axis-Aligned Boxes and Rays
//!
//! Plain geometric value types shared by every collision query.
//! Boxes are rebuilt per query from brush vertices or agent extents;
//! nothing here caches or mutates in place.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
///
/// Well-formed boxes satisfy `min <= max` on every axis. Malformed boxes
/// are tolerated by the collision functions and produce empty results.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its corners.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from a center point and half extents.
    #[inline]
    pub fn from_center_half_size(center: Vec3, half_size: Vec3) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Bounding box of a point cloud. `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full extents.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half extents.
    #[inline]
    pub fn half_size(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// True when `min <= max` on every axis and no component is NaN.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Check if a point lies inside or on the boundary.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Interval overlap on all three axes. Touching faces count as overlap.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Copy of this box moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Copy of this box grown by `amount` on every side.
    #[inline]
    pub fn inflated(&self, amount: Vec3) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }
}

/// Ray with a unit-length direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Starting point
    pub origin: Vec3,
    /// Normalized direction (zero if constructed from a zero vector)
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Outcome of a ray or sweep query.
///
/// `point`, `normal` and `distance` are only meaningful when `collided` is set.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionResult {
    /// Whether anything was hit
    pub collided: bool,
    /// Contact point
    pub point: Vec3,
    /// Single-axis unit normal of the face that was hit
    pub normal: Vec3,
    /// Distance along the ray to the contact
    pub distance: f32,
}

impl CollisionResult {
    /// Result for a query that hit nothing.
    pub const MISS: Self = Self {
        collided: false,
        point: Vec3::ZERO,
        normal: Vec3::ZERO,
        distance: 0.0,
    };
}
