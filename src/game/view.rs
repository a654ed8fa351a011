//! View Effects
//!
//! Field of view, camera height and head motion that follow the player's
//! movement mode. Purely presentational: nothing here feeds back into
//! physics, but the shake noise is seeded so replays look identical.

use glam::Vec3;

use crate::core::rng::DeterministicRng;
use crate::game::config::PlayerConfig;

/// FOV differences at or below this snap to the target.
const FOV_SNAP: f32 = 0.1;

/// Camera height differences at or below this snap to the target.
const HEIGHT_SNAP: f32 = 0.01;

/// Idle decay applied to the bob phase each tick.
const BOB_DECAY: f32 = 0.95;

/// Movement mode as seen by the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionMode {
    /// Sliding along the ground
    Slide,
    /// Crouch-walking
    Crouch,
    /// Sprinting
    Sprint,
    /// Walking
    Walk,
}

/// Head bob tuning for one [`MotionMode`].
#[derive(Clone, Copy, Debug, PartialEq)]
struct BobProfile {
    speed: f32,
    intensity: f32,
    side_intensity: f32,
    speed_divisor: f32,
}

impl MotionMode {
    fn profile(self) -> BobProfile {
        match self {
            MotionMode::Slide => BobProfile {
                speed: 20.0,
                intensity: 0.15,
                side_intensity: 0.08,
                speed_divisor: 15.0,
            },
            MotionMode::Crouch => BobProfile {
                speed: 4.0,
                intensity: 0.02,
                side_intensity: 0.01,
                speed_divisor: 2.0,
            },
            MotionMode::Sprint => BobProfile {
                speed: 14.0,
                intensity: 0.10,
                side_intensity: 0.05,
                speed_divisor: 10.0,
            },
            MotionMode::Walk => BobProfile {
                speed: 8.0,
                intensity: 0.04,
                side_intensity: 0.02,
                speed_divisor: 5.0,
            },
        }
    }
}

/// What the camera needs to know about the player this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSample {
    /// Current movement mode
    pub mode: MotionMode,
    /// Grounded and not flying
    pub grounded: bool,
    /// Horizontal speed driving the bob (momentum speed while sliding)
    pub speed: f32,
}

/// Camera state layered on top of the player's eye position.
#[derive(Clone, Debug)]
pub struct ViewEffects {
    /// Current field of view (degrees)
    pub fov: f32,
    /// Current camera height offset
    pub camera_height: f32,
    /// Head bob offset
    pub head_bob: Vec3,
    /// Shake offset
    pub shake: Vec3,
    bob_time: f32,
    rng: DeterministicRng,
}

impl ViewEffects {
    /// Start at the normal FOV and standing height.
    pub fn new(config: &PlayerConfig, seed: u64) -> Self {
        Self {
            fov: config.normal_fov,
            camera_height: 0.0,
            head_bob: Vec3::ZERO,
            shake: Vec3::ZERO,
            bob_time: 0.0,
            rng: DeterministicRng::new(seed),
        }
    }

    /// Combined bob and shake offset.
    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.head_bob + self.shake
    }

    /// Advance every effect by `dt`.
    pub fn update(&mut self, sample: ViewSample, dt: f32, config: &PlayerConfig) {
        self.update_fov(sample.mode, dt, config);
        self.update_motion(sample, dt);
        self.update_height(sample.mode, dt, config);
    }

    fn update_fov(&mut self, mode: MotionMode, dt: f32, config: &PlayerConfig) {
        let target = match mode {
            MotionMode::Slide => config.slide_fov,
            MotionMode::Sprint => config.sprint_fov,
            MotionMode::Crouch | MotionMode::Walk => config.normal_fov,
        };

        let diff = target - self.fov;
        if diff.abs() > FOV_SNAP {
            self.fov += diff * config.fov_transition_speed * dt;
        } else {
            self.fov = target;
        }
    }

    fn update_height(&mut self, mode: MotionMode, dt: f32, config: &PlayerConfig) {
        let target = match mode {
            MotionMode::Slide => config.slide_camera_offset,
            MotionMode::Crouch => config.crouch_camera_offset,
            MotionMode::Sprint | MotionMode::Walk => 0.0,
        };

        let diff = target - self.camera_height;
        if diff.abs() > HEIGHT_SNAP {
            self.camera_height += diff * config.camera_height_transition_speed * dt;
        } else {
            self.camera_height = target;
        }
    }

    fn update_motion(&mut self, sample: ViewSample, dt: f32) {
        self.head_bob = Vec3::ZERO;
        self.shake = Vec3::ZERO;

        if !sample.grounded {
            self.bob_time = 0.0;
            return;
        }

        let sliding = sample.mode == MotionMode::Slide;
        if sample.speed <= 0.1 && !sliding {
            self.bob_time *= BOB_DECAY;
            return;
        }

        let profile = sample.mode.profile();
        self.bob_time += dt * profile.speed * (sample.speed / profile.speed_divisor);
        let t = self.bob_time;

        self.head_bob = Vec3::new(
            (t * 0.5).sin() * profile.side_intensity,
            t.sin() * profile.intensity,
            (t * 2.0).sin() * profile.intensity * 0.3,
        );

        match sample.mode {
            MotionMode::Slide => {
                let noise = self.noise(0.03, 0.8);
                self.shake = noise
                    + Vec3::new(
                        (t * 3.5).sin() * 0.02,
                        (t * 4.0).sin() * 0.025,
                        (t * 0.8).sin() * 0.01,
                    );
            }
            MotionMode::Sprint => {
                let noise = self.noise(0.015, 0.5);
                self.shake =
                    noise + Vec3::new((t * 2.5).sin() * 0.01, (t * 3.0).sin() * 0.015, 0.0);
            }
            MotionMode::Crouch | MotionMode::Walk => {}
        }
    }

    /// Centered random offset; z is scaled by `z_scale`.
    fn noise(&mut self, intensity: f32, z_scale: f32) -> Vec3 {
        let half = 0.5 * intensity;
        Vec3::new(
            self.rng.next_signed() * half,
            self.rng.next_signed() * half,
            self.rng.next_signed() * half * z_scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(mode: MotionMode, speed: f32) -> ViewSample {
        ViewSample { mode, grounded: true, speed }
    }

    #[test]
    fn test_fov_converges_to_sprint() {
        let config = PlayerConfig::default();
        let mut view = ViewEffects::new(&config, 1);

        for _ in 0..600 {
            view.update(sample(MotionMode::Sprint, 10.0), 0.016, &config);
        }
        assert_eq!(view.fov, config.sprint_fov);

        for _ in 0..600 {
            view.update(sample(MotionMode::Walk, 0.0), 0.016, &config);
        }
        assert_eq!(view.fov, config.normal_fov);
    }

    #[test]
    fn test_camera_height_follows_crouch() {
        let config = PlayerConfig::default();
        let mut view = ViewEffects::new(&config, 1);

        view.update(sample(MotionMode::Crouch, 0.0), 0.016, &config);
        assert!(view.camera_height < 0.0);
        assert!(view.camera_height > config.crouch_camera_offset);

        for _ in 0..300 {
            view.update(sample(MotionMode::Crouch, 0.0), 0.016, &config);
        }
        assert_eq!(view.camera_height, config.crouch_camera_offset);
    }

    #[test]
    fn test_airborne_clears_motion() {
        let config = PlayerConfig::default();
        let mut view = ViewEffects::new(&config, 1);

        view.update(sample(MotionMode::Sprint, 10.0), 0.1, &config);
        assert!(view.offset() != Vec3::ZERO);

        let airborne = ViewSample { mode: MotionMode::Walk, grounded: false, speed: 5.0 };
        view.update(airborne, 0.1, &config);
        assert_eq!(view.offset(), Vec3::ZERO);
    }

    #[test]
    fn test_shake_is_seeded() {
        let config = PlayerConfig::default();
        let mut a = ViewEffects::new(&config, 99);
        let mut b = ViewEffects::new(&config, 99);

        for _ in 0..20 {
            a.update(sample(MotionMode::Slide, 12.0), 0.016, &config);
            b.update(sample(MotionMode::Slide, 12.0), 0.016, &config);
            assert_eq!(a.shake, b.shake);
        }
    }

    #[test]
    fn test_walk_has_no_shake() {
        let config = PlayerConfig::default();
        let mut view = ViewEffects::new(&config, 5);

        view.update(sample(MotionMode::Walk, 5.0), 0.1, &config);
        assert_eq!(view.shake, Vec3::ZERO);
        assert!(view.head_bob != Vec3::ZERO);
    }
}
