//! Input Frames
//!
//! One [`InputFrame`] per tick: a bitmask of held buttons plus the look
//! direction. Press and release edges are found by comparing against the
//! previous frame's buttons, so a recorded frame sequence replays exactly.

use glam::Vec3;
use serde::{Deserialize, Serialize};

// =============================================================================
// VIEW BASIS
// =============================================================================

/// Camera axes derived from a look direction. World up is +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBasis {
    /// Look direction (unit)
    pub front: Vec3,
    /// Screen right (unit)
    pub right: Vec3,
    /// Screen up (unit)
    pub up: Vec3,
}

impl ViewBasis {
    /// Build the basis for `look`. A zero look falls back to -Z.
    pub fn from_look(look: Vec3) -> Self {
        let mut front = look.normalize_or_zero();
        if front == Vec3::ZERO {
            front = Vec3::NEG_Z;
        }

        let mut right = front.cross(Vec3::Y).normalize_or_zero();
        if right == Vec3::ZERO {
            // Looking straight up or down
            right = Vec3::X;
        }
        let up = right.cross(front).normalize_or_zero();

        Self { front, right, up }
    }
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Held buttons and look direction for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Held button bits (see the associated constants)
    pub buttons: u16,
    /// Look direction, need not be normalized
    pub look: Vec3,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl InputFrame {
    /// W
    pub const FORWARD: u16 = 1 << 0;
    /// S
    pub const BACK: u16 = 1 << 1;
    /// A
    pub const LEFT: u16 = 1 << 2;
    /// D
    pub const RIGHT: u16 = 1 << 3;
    /// Space: jump, or fly up in god mode
    pub const JUMP: u16 = 1 << 4;
    /// Ctrl: crouch or slide
    pub const CROUCH: u16 = 1 << 5;
    /// Shift: sprint toggle, or fly down in god mode
    pub const SPRINT: u16 = 1 << 6;
    /// G: god mode toggle
    pub const GOD_MODE: u16 = 1 << 7;
    /// Mouse button: fire
    pub const FIRE: u16 = 1 << 8;

    /// No buttons, looking down -Z.
    pub const fn new() -> Self {
        Self {
            buttons: 0,
            look: Vec3::NEG_Z,
        }
    }

    /// Frame with the given buttons held, looking down -Z.
    pub const fn with_buttons(buttons: u16) -> Self {
        Self {
            buttons,
            look: Vec3::NEG_Z,
        }
    }

    /// Same frame looking along `look`.
    pub fn looking(mut self, look: Vec3) -> Self {
        self.look = look;
        self
    }

    /// Check if every bit of `flag` is held.
    #[inline]
    pub fn held(&self, flag: u16) -> bool {
        self.buttons & flag == flag
    }

    /// Rising edge of `flag` relative to `previous` buttons.
    #[inline]
    pub fn pressed(&self, flag: u16, previous: u16) -> bool {
        self.held(flag) && previous & flag != flag
    }

    /// Falling edge of `flag` relative to `previous` buttons.
    #[inline]
    pub fn released(&self, flag: u16, previous: u16) -> bool {
        !self.held(flag) && previous & flag == flag
    }

    /// Camera basis for this frame.
    #[inline]
    pub fn basis(&self) -> ViewBasis {
        ViewBasis::from_look(self.look)
    }

    /// Unit wish direction from the movement keys, or zero.
    ///
    /// Walking flattens the camera axes onto the XZ plane. Flying keeps
    /// them 3D and adds Space/Shift as up/down.
    pub fn wish_direction(&self, flying: bool) -> Vec3 {
        let basis = self.basis();
        let (forward, right) = if flying {
            (basis.front, basis.right)
        } else {
            (
                Vec3::new(basis.front.x, 0.0, basis.front.z).normalize_or_zero(),
                Vec3::new(basis.right.x, 0.0, basis.right.z).normalize_or_zero(),
            )
        };

        let mut wish = Vec3::ZERO;
        if self.held(Self::FORWARD) {
            wish += forward;
        }
        if self.held(Self::BACK) {
            wish -= forward;
        }
        if self.held(Self::LEFT) {
            wish -= right;
        }
        if self.held(Self::RIGHT) {
            wish += right;
        }
        if flying {
            if self.held(Self::JUMP) {
                wish += basis.up;
            }
            if self.held(Self::SPRINT) {
                wish -= basis.up;
            }
        }

        wish.normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let frame = InputFrame::with_buttons(InputFrame::JUMP | InputFrame::FORWARD);

        assert!(frame.pressed(InputFrame::JUMP, 0));
        assert!(!frame.pressed(InputFrame::JUMP, InputFrame::JUMP));
        assert!(!frame.released(InputFrame::CROUCH, 0));
        assert!(InputFrame::new().released(InputFrame::CROUCH, InputFrame::CROUCH));
    }

    #[test]
    fn test_basis_default_look() {
        let basis = InputFrame::new().basis();
        assert_eq!(basis.front, Vec3::NEG_Z);
        assert!((basis.right - Vec3::X).length() < 1e-6);
        assert!((basis.up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_basis_straight_up_is_finite() {
        let basis = ViewBasis::from_look(Vec3::Y);
        assert!(basis.right.is_finite());
        assert!(basis.up.is_finite());
        assert!((basis.right.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_walking_direction_is_flat() {
        // Looking 45 degrees down still walks horizontally
        let frame =
            InputFrame::with_buttons(InputFrame::FORWARD).looking(Vec3::new(0.0, -1.0, -1.0));
        let wish = frame.wish_direction(false);
        assert_eq!(wish.y, 0.0);
        assert!((wish - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let frame = InputFrame::with_buttons(InputFrame::LEFT | InputFrame::RIGHT);
        assert_eq!(frame.wish_direction(false), Vec3::ZERO);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let frame = InputFrame::with_buttons(InputFrame::FORWARD | InputFrame::RIGHT);
        assert!((frame.wish_direction(false).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_flying_uses_vertical_keys() {
        let up = InputFrame::with_buttons(InputFrame::JUMP).wish_direction(true);
        assert!((up - Vec3::Y).length() < 1e-5);

        let down = InputFrame::with_buttons(InputFrame::SPRINT).wish_direction(true);
        assert!((down - Vec3::NEG_Y).length() < 1e-5);

        // Not flying: space does not move you
        assert_eq!(InputFrame::with_buttons(InputFrame::JUMP).wish_direction(false), Vec3::ZERO);
    }
}
