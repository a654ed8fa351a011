//! Player Movement Controller
//!
//! Two velocity channels drive the player:
//!
//! - `velocity`: instantaneous, rebuilt from input every tick
//! - `momentum`: persistent, decays with friction or air resistance
//!
//! On the ground input wins whenever there is any, and momentum only
//! carries the player when the keys are released. In the air momentum is
//! added on top of weak air control. Sliding hands control to momentum
//! entirely.
//!
//! Every committed displacement goes through [`Player::move_with_collision`],
//! which resolves X, then Y, then Z independently against the map's brushes.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::aabb::Aabb;
use crate::game::config::PlayerConfig;
use crate::game::input::InputFrame;
use crate::game::map::Map;
use crate::game::view::{MotionMode, ViewEffects, ViewSample};

/// Horizontal input speed below which the player counts as not steering.
const INPUT_EPSILON: f32 = 0.1;

/// Slides end once momentum drops to this speed.
const SLIDE_STOP_SPEED: f32 = 0.3;

/// Momentum below this is cleared outright.
const MOMENTUM_EPSILON: f32 = 0.01;

/// Per-axis displacement below this is not attempted.
const MIN_AXIS_MOVE: f32 = 1e-4;

/// Difference between desired and actual displacement that counts as blocked.
const BLOCK_EPSILON: f32 = 0.001;

/// Gap kept between the feet and a ledge climbed by step-up.
const STEP_CLEARANCE: f32 = 0.01;

/// Gap kept between the feet and the supporting surface.
const GROUND_SKIN: f32 = 0.01;

/// A surface supports the player only if its top is at most this far above the feet.
const SUPPORT_TOLERANCE: f32 = 0.1;

// =============================================================================
// STATE
// =============================================================================

/// Observed movement state, derived from physics after every update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Grounded, not moving
    #[default]
    Idle,
    /// Grounded, walking
    Walking,
    /// Grounded and sprinting, or flying in god mode
    Running,
    /// Grounded and crouched
    Crouching,
    /// Airborne and rising
    Jumping,
    /// Airborne and falling
    Falling,
    /// Grounded and sliding
    Sliding,
}

/// Posture. Exactly one at a time, so crouch and slide cannot overlap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Stance {
    /// Upright
    Standing,
    /// Crouched, slow walking
    Crouching,
    /// Momentum-driven slide
    Sliding {
        /// Seconds since the slide started
        time: f32,
        /// Unit horizontal direction the slide started in
        direction: Vec3,
    },
}

/// The local player.
#[derive(Clone, Debug)]
pub struct Player {
    /// Feet position
    pub position: Vec3,
    /// Instantaneous input-driven velocity (y carries gravity and jumps)
    pub velocity: Vec3,
    /// Persistent horizontal carry-over
    pub momentum: Vec3,
    /// Standing on a brush
    pub on_ground: bool,
    /// Health in `[0, max_hp]`
    pub hp: f32,
    stance: Stance,
    sprint_toggled: bool,
    sprinting: bool,
    god_mode: bool,
    flight_speed: f32,
    prev_buttons: u16,
    state: PlayerState,
    view: ViewEffects,
    config: PlayerConfig,
}

impl Player {
    /// Spawn at `position` with full health. `seed` drives camera shake.
    pub fn new(position: Vec3, config: &PlayerConfig, seed: u64) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            momentum: Vec3::ZERO,
            on_ground: false,
            hp: config.max_hp,
            stance: Stance::Standing,
            sprint_toggled: false,
            sprinting: false,
            god_mode: config.enable_god_mode,
            flight_speed: 0.0,
            prev_buttons: 0,
            state: PlayerState::Idle,
            view: ViewEffects::new(config, seed),
            config: config.clone(),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Derived movement state.
    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Current posture.
    #[inline]
    pub fn stance(&self) -> Stance {
        self.stance
    }

    /// Check if sliding.
    #[inline]
    pub fn is_sliding(&self) -> bool {
        matches!(self.stance, Stance::Sliding { .. })
    }

    /// Check if crouched.
    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.stance == Stance::Crouching
    }

    /// Sprint toggle is on (sprinting still needs forward input).
    #[inline]
    pub fn sprint_toggled(&self) -> bool {
        self.sprint_toggled
    }

    /// Actually sprinting this tick.
    #[inline]
    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    /// Free flight without collision.
    #[inline]
    pub fn is_god_mode(&self) -> bool {
        self.god_mode
    }

    /// Check if health is exhausted.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Full health.
    #[inline]
    pub fn max_hp(&self) -> f32 {
        self.config.max_hp
    }

    /// Current field of view (degrees).
    #[inline]
    pub fn fov(&self) -> f32 {
        self.view.fov
    }

    /// View effects state.
    pub fn view(&self) -> &ViewEffects {
        &self.view
    }

    /// Collision box: feet-anchored, `2 * radius` wide.
    pub fn aabb(&self) -> Aabb {
        let half = Vec3::new(self.config.radius, self.config.height * 0.5, self.config.radius);
        Aabb::from_center_half_size(self.position + Vec3::Y * half.y, half)
    }

    /// Camera position: eye height plus the crouch/slide height offset.
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * (self.config.eye_height + self.view.camera_height)
    }

    /// Head bob and shake to add to the camera.
    pub fn camera_offset(&self) -> Vec3 {
        self.view.offset()
    }

    // =========================================================================
    // HEALTH
    // =========================================================================

    /// Apply damage; health stays within `[0, max_hp]`.
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).clamp(0.0, self.config.max_hp);
    }

    /// Reset to a fresh spawn at `position`.
    pub fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.momentum = Vec3::ZERO;
        self.on_ground = false;
        self.hp = self.config.max_hp;
        self.state = PlayerState::Idle;
        self.stance = Stance::Standing;
        self.sprinting = false;
        self.sprint_toggled = false;
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Advance one tick: input, then physics, then view and state.
    ///
    /// `map = None` means no obstacles and no ground.
    pub fn update(&mut self, input: &InputFrame, dt: f32, map: Option<&Map>) {
        self.apply_input(input, dt);

        if !self.god_mode {
            self.update_physics(dt, map);
        }

        let sample = self.view_sample();
        self.view.update(sample, dt, &self.config);
        self.state = self.derive_state();
    }

    /// Turn this frame's buttons into velocity, momentum and stance changes.
    fn apply_input(&mut self, input: &InputFrame, dt: f32) {
        let prev = self.prev_buttons;
        self.prev_buttons = input.buttons;

        if input.pressed(InputFrame::GOD_MODE, prev) {
            self.god_mode = !self.god_mode;
            debug!(enabled = self.god_mode, "God mode toggled");
        }

        let movement = input.wish_direction(self.god_mode) * self.movement_speed();

        if self.god_mode {
            self.position += movement * dt;
            self.velocity = Vec3::ZERO;
            self.momentum = Vec3::ZERO;
            self.flight_speed = movement.length();
            return;
        }

        if self.on_ground {
            if self.is_sliding() {
                self.velocity.x = 0.0;
                self.velocity.z = 0.0;
            } else {
                self.velocity.x = movement.x;
                self.velocity.z = movement.z;
                if horizontal(movement).length() > INPUT_EPSILON {
                    // Remembered so a jump carries this direction
                    self.momentum.x = movement.x;
                    self.momentum.z = movement.z;
                }
            }
        } else {
            self.velocity.x = movement.x * self.config.air_control;
            self.velocity.z = movement.z * self.config.air_control;
        }

        self.apply_crouch(input, prev, movement);

        if input.pressed(InputFrame::SPRINT, prev) && self.stance == Stance::Standing {
            self.sprint_toggled = !self.sprint_toggled;
        }
        self.sprinting = self.sprint_toggled
            && input.held(InputFrame::FORWARD)
            && self.stance == Stance::Standing;

        if input.pressed(InputFrame::JUMP, prev) && self.on_ground {
            self.velocity.y = self.config.jump_velocity;
            self.on_ground = false;
            // Interrupts slide and crouch; momentum carries through
            self.stance = Stance::Standing;
        }
    }

    fn apply_crouch(&mut self, input: &InputFrame, prev: u16, movement: Vec3) {
        if input.pressed(InputFrame::CROUCH, prev) && self.on_ground {
            match self.stance {
                Stance::Sliding { .. } => self.end_slide_into_sprint(),
                Stance::Crouching => {
                    if self.config.crouch_toggle {
                        self.stance = Stance::Standing;
                    }
                }
                Stance::Standing => {
                    if horizontal(self.velocity).length() > self.config.slide_trigger_speed {
                        self.start_slide(movement);
                    } else {
                        self.stance = Stance::Crouching;
                    }
                }
            }
        }

        if !self.config.crouch_toggle
            && input.released(InputFrame::CROUCH, prev)
            && self.stance == Stance::Crouching
        {
            self.stance = Stance::Standing;
        }
    }

    fn start_slide(&mut self, movement: Vec3) {
        let steer = horizontal(movement);
        let direction = if steer.length() > INPUT_EPSILON {
            steer.normalize_or_zero()
        } else {
            horizontal(self.velocity).normalize_or_zero()
        };

        self.momentum.x = direction.x * self.config.slide_speed;
        self.momentum.z = direction.z * self.config.slide_speed;
        self.stance = Stance::Sliding { time: 0.0, direction };
    }

    /// Crouch pressed mid-slide: stand up, keeping sprint if fast enough.
    fn end_slide_into_sprint(&mut self) {
        self.stance = Stance::Standing;

        let carry = horizontal(self.momentum);
        let speed = carry.length();
        if speed >= self.config.sprint_speed && speed > INPUT_EPSILON {
            self.sprint_toggled = true;
            let sprint = carry / speed * self.config.sprint_speed;
            self.velocity.x = sprint.x;
            self.velocity.z = sprint.z;
            self.momentum.x = sprint.x;
            self.momentum.z = sprint.z;
        } else {
            self.velocity.x = self.momentum.x;
            self.velocity.z = self.momentum.z;
        }
    }

    fn movement_speed(&self) -> f32 {
        if self.god_mode {
            self.config.god_mode_speed
        } else if self.stance == Stance::Crouching {
            self.config.crouch_speed
        } else if self.sprinting {
            self.config.sprint_speed
        } else {
            self.config.move_speed
        }
    }

    fn update_physics(&mut self, dt: f32, map: Option<&Map>) {
        if self.on_ground {
            self.velocity.y = 0.0;
        } else {
            self.velocity.y =
                (self.velocity.y + self.config.gravity * dt).max(self.config.max_fall_speed);
        }

        self.update_slide(dt);
        self.decay_momentum(dt);

        let mut total = self.velocity;
        if self.on_ground {
            if horizontal(self.velocity).length() <= INPUT_EPSILON {
                total.x = self.momentum.x;
                total.z = self.momentum.z;
            }
        } else {
            total.x += self.momentum.x;
            total.z += self.momentum.z;
        }

        let desired = total * dt;
        let actual = self.move_with_collision(desired, map);
        self.position += actual;

        // Soft bounce off walls; landing or head bump stops vertical motion
        if (desired.x - actual.x).abs() > BLOCK_EPSILON {
            self.momentum.x *= 0.5;
        }
        if (desired.z - actual.z).abs() > BLOCK_EPSILON {
            self.momentum.z *= 0.5;
        }
        if (desired.y - actual.y).abs() > BLOCK_EPSILON {
            self.velocity.y = 0.0;
        }

        let support = if self.velocity.y > 0.0 {
            None
        } else {
            self.ground_support(map)
        };
        self.on_ground = support.is_some();
        if let Some(top) = support {
            self.position.y = top + GROUND_SKIN;
            self.velocity.y = 0.0;
        }
    }

    fn update_slide(&mut self, dt: f32) {
        let Stance::Sliding { time, direction } = self.stance else {
            return;
        };

        let time = time + dt;
        if time >= self.config.max_slide_time || !self.on_ground {
            self.stance = Stance::Standing;
            self.sprint_toggled = false;
            return;
        }

        let carry = horizontal(self.momentum);
        let speed = carry.length();
        if speed > SLIDE_STOP_SPEED {
            let slowed = (speed - self.config.slide_friction * dt).max(0.0);
            let scaled = carry / speed * slowed;
            self.momentum.x = scaled.x;
            self.momentum.z = scaled.z;
            self.stance = Stance::Sliding { time, direction };
        } else {
            self.momentum.x = 0.0;
            self.momentum.z = 0.0;
            self.stance = Stance::Standing;
            self.sprint_toggled = false;
            self.sprinting = false;
        }
    }

    fn decay_momentum(&mut self, dt: f32) {
        if self.is_sliding() {
            return;
        }

        if self.on_ground {
            if horizontal(self.velocity).length() >= INPUT_EPSILON {
                return;
            }
            let carry = horizontal(self.momentum);
            let speed = carry.length();
            let friction = self.config.ground_friction * dt;
            if speed <= MOMENTUM_EPSILON || friction >= speed {
                self.momentum.x = 0.0;
                self.momentum.z = 0.0;
            } else {
                let slowed = carry / speed * (speed - friction);
                self.momentum.x = slowed.x;
                self.momentum.z = slowed.z;
            }
        } else {
            self.momentum *= (1.0 - self.config.air_resistance * dt).max(0.0);
        }
    }

    // =========================================================================
    // COLLISION
    // =========================================================================

    /// Resolve `movement` one axis at a time (X, Y, Z) against every brush.
    ///
    /// Horizontal moves advance in pieces no longer than half the box so thin
    /// walls cannot be skipped, and a blocked piece first tries to step up onto
    /// the obstacle. The vertical move is swept and stops at the first surface
    /// crossed. Returns the displacement that is safe to commit.
    pub fn move_with_collision(&self, movement: Vec3, map: Option<&Map>) -> Vec3 {
        let Some(map) = map else {
            return movement;
        };
        if self.god_mode {
            return movement;
        }

        let boxes: Vec<Aabb> = map.brush_boxes().collect();
        let mut result = Vec3::ZERO;
        let mut current = self.aabb();

        for axis in 0..3 {
            let delta = movement[axis];
            if delta.abs() < MIN_AXIS_MOVE {
                continue;
            }

            if axis == 1 {
                let allowed = vertical_travel(&current, delta, &boxes);
                result.y += allowed;
                current = current.translated(Vec3::Y * allowed);
                continue;
            }

            let max_piece = current.half_size()[axis].max(MIN_AXIS_MOVE);
            let pieces = (delta.abs() / max_piece).ceil().max(1.0) as u32;
            let mut step = Vec3::ZERO;
            step[axis] = delta / pieces as f32;

            for _ in 0..pieces {
                let moved = current.translated(step);
                let Some(top) = highest_top(boxes.iter().filter(|b| moved.intersects(b))) else {
                    result[axis] += step[axis];
                    current = moved;
                    continue;
                };

                let lift = if self.on_ground {
                    self.step_lift(&current, step, top, &boxes)
                } else {
                    None
                };
                match lift {
                    Some(lift) => {
                        result[axis] += step[axis];
                        result.y += lift;
                        current = moved.translated(Vec3::Y * lift);
                    }
                    None => break,
                }
            }
        }

        result
    }

    /// Vertical lift that puts the box on top of a ledge at `top`, if the
    /// ledge is low enough and the raised box is clear of every brush.
    fn step_lift(&self, current: &Aabb, step: Vec3, top: f32, boxes: &[Aabb]) -> Option<f32> {
        let rise = top - current.min.y;
        if rise > self.config.step_height {
            return None;
        }

        let lift = rise + STEP_CLEARANCE;
        let raised = current.translated(step + Vec3::Y * lift);
        if boxes.iter().any(|b| raised.intersects(b)) {
            return None;
        }
        Some(lift)
    }

    /// Top of the highest brush under the feet, if any is close enough to stand on.
    fn ground_support(&self, map: Option<&Map>) -> Option<f32> {
        let map = map?;
        let mut probe = self.aabb();
        probe.min.y -= self.config.ground_check_distance;

        let limit = self.position.y + SUPPORT_TOLERANCE;
        map.brush_boxes()
            .filter(|b| probe.intersects(b) && b.max.y <= limit)
            .map(|b| b.max.y)
            .reduce(f32::max)
    }

    // =========================================================================
    // DERIVED STATE
    // =========================================================================

    fn derive_state(&self) -> PlayerState {
        if self.god_mode {
            return if self.flight_speed > INPUT_EPSILON {
                PlayerState::Running
            } else {
                PlayerState::Idle
            };
        }

        if !self.on_ground {
            return if self.velocity.y > 0.0 {
                PlayerState::Jumping
            } else {
                PlayerState::Falling
            };
        }

        match self.stance {
            Stance::Sliding { .. } => PlayerState::Sliding,
            Stance::Crouching => PlayerState::Crouching,
            Stance::Standing if horizontal(self.velocity).length() > INPUT_EPSILON => {
                if self.sprinting {
                    PlayerState::Running
                } else {
                    PlayerState::Walking
                }
            }
            Stance::Standing => PlayerState::Idle,
        }
    }

    fn view_sample(&self) -> ViewSample {
        let (mode, speed) = match self.stance {
            Stance::Sliding { .. } => (MotionMode::Slide, horizontal(self.momentum).length()),
            Stance::Crouching => (MotionMode::Crouch, horizontal(self.velocity).length()),
            Stance::Standing if self.sprinting => {
                (MotionMode::Sprint, horizontal(self.velocity).length())
            }
            Stance::Standing => (MotionMode::Walk, horizontal(self.velocity).length()),
        };

        ViewSample {
            mode,
            grounded: self.on_ground && !self.god_mode,
            speed,
        }
    }
}

/// XZ part of a vector.
#[inline]
fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

fn highest_top<'a>(boxes: impl Iterator<Item = &'a Aabb>) -> Option<f32> {
    boxes.map(|b| b.max.y).reduce(f32::max)
}

/// How far `current` can travel `dy` vertically before touching a brush.
///
/// The whole span between the start and end boxes is tested, so a fall
/// longer than the box is tall still lands on the first surface below.
/// Boxes already overlapping `current` block all travel.
fn vertical_travel(current: &Aabb, dy: f32, boxes: &[Aabb]) -> f32 {
    let moved = current.translated(Vec3::Y * dy);
    let swept = Aabb::new(current.min.min(moved.min), current.max.max(moved.max));
    let hits = boxes.iter().filter(|b| swept.intersects(b));

    if dy < 0.0 {
        hits.filter(|b| b.min.y < current.max.y)
            .map(|b| (b.max.y + GROUND_SKIN - current.min.y).min(0.0))
            .fold(dy, f32::max)
    } else {
        hits.filter(|b| b.max.y > current.min.y)
            .map(|b| (b.min.y - GROUND_SKIN - current.max.y).max(0.0))
            .fold(dy, f32::min)
    }
}

// =============================================================================
// TESTS
// =============================================================================
