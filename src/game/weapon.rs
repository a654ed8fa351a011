//! Projectile Weapon
//!
//! Bullets integrate linearly and are hit-tested with the swept segment
//! from last tick's position to this tick's, so fast bullets cannot skip
//! through thin brushes or enemies between ticks.
//!
//! Hit order per bullet per tick:
//! 1. World brushes (nearest entry point wins)
//! 2. Damage targets, only if no brush was hit
//! 3. Expiry
//!
//! Bullets younger than `min_hit_age` register nothing, which keeps them
//! from colliding with geometry right at the muzzle.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::aabb::Aabb;
use crate::core::collision::segment_hit_fraction;
use crate::game::config::WeaponConfig;
use crate::game::input::ViewBasis;
use crate::game::map::Map;

// =============================================================================
// DAMAGE TARGETS
// =============================================================================

/// A hit reported by a [`DamageTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetHit {
    /// Id of the entity hit
    pub target_id: u32,
    /// Where the segment entered its box
    pub point: Vec3,
    /// This hit was fatal
    pub killed: bool,
    /// Hit points left after the hit
    pub hp_left: i32,
}

/// Anything a bullet can damage.
pub trait DamageTarget {
    /// Test the segment `start -> end`; on a hit apply `damage` to the
    /// first entity struck and report it. At most one entity per call.
    fn segment_hit(&mut self, start: Vec3, end: Vec3, damage: i32) -> Option<TargetHit>;
}

// =============================================================================
// BULLET
// =============================================================================

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Current position
    pub position: Vec3,
    /// Position before the last advance
    pub prev_position: Vec3,
    /// Velocity (direction * speed)
    pub velocity: Vec3,
    /// Unit travel direction
    pub direction: Vec3,
    /// Seconds since firing
    pub lifetime: f32,
    /// Seconds until expiry
    pub max_lifetime: f32,
    /// Units per second
    pub speed: f32,
}

impl Bullet {
    /// New bullet at `origin`. `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3, speed: f32, max_lifetime: f32) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            position: origin,
            prev_position: origin,
            velocity: direction * speed,
            direction,
            lifetime: 0.0,
            max_lifetime,
            speed,
        }
    }

    /// Integrate one tick.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.prev_position = self.position;
        self.position += self.velocity * dt;
        self.lifetime += dt;
    }

    /// Check if the bullet has not yet expired.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifetime < self.max_lifetime
    }

    /// Old enough to register hits.
    #[inline]
    pub fn can_hit(&self, min_hit_age: f32) -> bool {
        self.lifetime > min_hit_age
    }
}

/// What happened to a bullet that left flight this tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Stopped by a brush
    HitWorld {
        /// Entry point on the brush box
        point: Vec3,
    },
    /// Stopped by a damage target
    HitTarget(TargetHit),
    /// Ran out of lifetime
    Expired {
        /// Last position
        position: Vec3,
    },
}

// =============================================================================
// WEAPON
// =============================================================================

/// Rate-limited bullet emitter plus the bullets it owns.
#[derive(Clone, Debug)]
pub struct Weapon {
    bullets: Vec<Bullet>,
    cooldown: f32,
    config: WeaponConfig,
}

impl Weapon {
    /// Ready to fire, no bullets in flight.
    pub fn new(config: &WeaponConfig) -> Self {
        Self {
            bullets: Vec::new(),
            cooldown: 0.0,
            config: config.clone(),
        }
    }

    /// Bullets in flight.
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Positions of bullets in flight.
    pub fn bullet_positions(&self) -> Vec<Vec3> {
        self.bullets.iter().map(|b| b.position).collect()
    }

    /// Seconds until the next shot is allowed.
    #[inline]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Check if a shot is allowed now.
    #[inline]
    pub fn can_fire(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Fire from the eye along `basis`, if off cooldown.
    ///
    /// The bullet leaves from a muzzle offset to the lower right and is aimed
    /// at a point on the view centre line, so it converges on the crosshair.
    pub fn fire(&mut self, eye: Vec3, basis: &ViewBasis) -> Option<&Bullet> {
        if !self.can_fire() {
            return None;
        }

        let muzzle = eye
            + basis.front * self.config.muzzle_forward
            + basis.right * self.config.muzzle_right
            - basis.up * self.config.muzzle_down;
        let aim = eye + basis.front * self.config.aim_distance;

        let mut direction = (aim - muzzle).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = basis.front;
        }

        self.cooldown = self.config.fire_interval;
        Some(self.spawn_bullet(muzzle, direction))
    }

    /// Add a bullet at `origin` without touching the cooldown.
    pub fn spawn_bullet(&mut self, origin: Vec3, direction: Vec3) -> &Bullet {
        let index = self.bullets.len();
        self.bullets.push(Bullet::new(
            origin,
            direction,
            self.config.bullet_speed,
            self.config.max_lifetime,
        ));
        &self.bullets[index]
    }

    /// Advance the cooldown and every bullet, resolving hits.
    ///
    /// Returns the outcome of each bullet removed this tick.
    pub fn update(
        &mut self,
        dt: f32,
        map: Option<&Map>,
        mut targets: Option<&mut dyn DamageTarget>,
    ) -> Vec<ShotOutcome> {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }

        let boxes: Vec<Aabb> = map.map(|m| m.brush_boxes().collect()).unwrap_or_default();
        let min_hit_age = self.config.min_hit_age;
        let damage = self.config.damage;
        let mut outcomes = Vec::new();

        self.bullets.retain_mut(|bullet| {
            bullet.advance(dt);

            if bullet.can_hit(min_hit_age) {
                if let Some(point) = world_hit(bullet, &boxes) {
                    outcomes.push(ShotOutcome::HitWorld { point });
                    return false;
                }

                if let Some(targets) = targets.as_mut() {
                    let hit = targets.segment_hit(bullet.prev_position, bullet.position, damage);
                    if let Some(hit) = hit {
                        outcomes.push(ShotOutcome::HitTarget(hit));
                        return false;
                    }
                }
            }

            if !bullet.is_alive() {
                outcomes.push(ShotOutcome::Expired {
                    position: bullet.position,
                });
                return false;
            }
            true
        });

        outcomes
    }

    /// Drop every bullet and reset the cooldown.
    pub fn clear(&mut self) {
        self.bullets.clear();
        self.cooldown = 0.0;
    }
}

/// Nearest brush entry along this tick's swept segment.
fn world_hit(bullet: &Bullet, boxes: &[Aabb]) -> Option<Vec3> {
    let start = bullet.prev_position;
    let end = bullet.position;
    boxes
        .iter()
        .filter_map(|b| segment_hit_fraction(start, end, b))
        .reduce(f32::min)
        .map(|t| start + (end - start) * t)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::Brush;

    const DT: f32 = 0.016;

    fn wall_map(z: f32) -> Map {
        let mut map = Map::default();
        map.add_brush(Brush::cuboid(
            1,
            Vec3::new(-10.0, -10.0, z - 1.0),
            Vec3::new(10.0, 10.0, z),
            "wall",
        ));
        map
    }

    /// Target that always reports a hit, counting calls.
    struct AlwaysHit {
        calls: u32,
    }

    impl DamageTarget for AlwaysHit {
        fn segment_hit(&mut self, start: Vec3, _end: Vec3, _damage: i32) -> Option<TargetHit> {
            self.calls += 1;
            Some(TargetHit {
                target_id: 7,
                point: start,
                killed: false,
                hp_left: 1,
            })
        }
    }

    #[test]
    fn test_bullet_integration_is_linear() {
        let config = WeaponConfig::default();
        let mut weapon = Weapon::new(&config);
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let direction = Vec3::new(0.0, 0.0, -1.0);
        weapon.spawn_bullet(origin, direction);

        let ticks = 30;
        for _ in 0..ticks {
            assert!(weapon.update(DT, None, None).is_empty());
        }

        let expected = origin + direction * config.bullet_speed * ticks as f32 * DT;
        let bullet = &weapon.bullets()[0];
        assert!((bullet.position - expected).length() < 1e-3);
        assert!((bullet.lifetime - ticks as f32 * DT).abs() < 1e-5);
    }

    #[test]
    fn test_bullet_expires() {
        let config = WeaponConfig::default();
        let mut weapon = Weapon::new(&config);
        weapon.spawn_bullet(Vec3::ZERO, Vec3::X);

        let mut outcomes = Vec::new();
        for _ in 0..200 {
            outcomes.extend(weapon.update(DT, None, None));
        }
        assert!(weapon.bullets().is_empty());
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ShotOutcome::Expired { .. }));
    }

    #[test]
    fn test_two_bullets_hit_wall() {
        let config = WeaponConfig::default();
        let map = wall_map(-5.0);
        let mut weapon = Weapon::new(&config);

        weapon.spawn_bullet(Vec3::ZERO, Vec3::NEG_Z);
        let first = weapon.update(0.01, Some(&map), None);
        assert!(first.is_empty());

        weapon.spawn_bullet(Vec3::ZERO, Vec3::NEG_Z);
        let mut hits = Vec::new();
        for tick in 0..20 {
            for outcome in weapon.update(DT, Some(&map), None) {
                hits.push((tick, outcome));
            }
        }

        assert_eq!(hits.len(), 2);
        for (tick, outcome) in hits {
            // Never in the spawn tick
            assert!(tick > 0);
            match outcome {
                ShotOutcome::HitWorld { point } => assert!((point.z - -5.0).abs() < 1e-4),
                other => panic!("expected a wall hit, got {other:?}"),
            }
        }
        assert!(weapon.bullets().is_empty());
    }

    #[test]
    fn test_young_bullet_ignores_everything() {
        let config = WeaponConfig::default();
        // Wall right at the muzzle
        let map = wall_map(-0.5);
        let mut weapon = Weapon::new(&config);
        let mut target = AlwaysHit { calls: 0 };

        weapon.spawn_bullet(Vec3::ZERO, Vec3::NEG_Z);
        let outcomes = weapon.update(DT, Some(&map), Some(&mut target));
        assert!(outcomes.is_empty());
        assert_eq!(target.calls, 0);
        assert_eq!(weapon.bullets().len(), 1);
    }

    #[test]
    fn test_world_hit_skips_target_check() {
        let config = WeaponConfig::default();
        let map = wall_map(-2.0);
        let mut weapon = Weapon::new(&config);
        let mut target = AlwaysHit { calls: 0 };

        weapon.spawn_bullet(Vec3::new(0.0, 0.0, -1.0), Vec3::NEG_Z);
        // Young tick: no checks at all
        weapon.update(DT, Some(&map), Some(&mut target));
        let outcomes = weapon.update(DT, Some(&map), Some(&mut target));

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ShotOutcome::HitWorld { .. }));
        assert_eq!(target.calls, 0);
    }

    #[test]
    fn test_target_hit_removes_bullet() {
        let config = WeaponConfig::default();
        let mut weapon = Weapon::new(&config);
        let mut target = AlwaysHit { calls: 0 };

        weapon.spawn_bullet(Vec3::ZERO, Vec3::X);
        weapon.update(DT, None, Some(&mut target));
        let outcomes = weapon.update(DT, None, Some(&mut target));

        assert_eq!(target.calls, 1);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ShotOutcome::HitTarget(TargetHit { target_id: 7, .. })));
        assert!(weapon.bullets().is_empty());
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let config = WeaponConfig::default();
        let mut weapon = Weapon::new(&config);
        let basis = ViewBasis::from_look(Vec3::NEG_Z);

        assert!(weapon.fire(Vec3::ZERO, &basis).is_some());
        assert!(weapon.fire(Vec3::ZERO, &basis).is_none());
        assert!(!weapon.can_fire());

        // 0.06s interval: four 16ms ticks
        for _ in 0..4 {
            weapon.update(DT, None, None);
        }
        assert!(weapon.can_fire());
        assert!(weapon.fire(Vec3::ZERO, &basis).is_some());
        assert_eq!(weapon.bullets().len(), 2);
    }

    #[test]
    fn test_fire_converges_on_crosshair() {
        let config = WeaponConfig::default();
        let mut weapon = Weapon::new(&config);
        let eye = Vec3::new(0.0, 1.6, 0.0);
        let basis = ViewBasis::from_look(Vec3::NEG_Z);

        let bullet = weapon.fire(eye, &basis).unwrap().clone();
        assert!((bullet.position - Vec3::new(0.2, 1.45, -0.3)).length() < 1e-5);
        assert!((bullet.direction.length() - 1.0).abs() < 1e-5);

        // Passes through the aim point
        let aim = eye + basis.front * config.aim_distance;
        let to_aim = (aim - bullet.position).normalize();
        assert!((to_aim - bullet.direction).length() < 1e-5);
    }
}
