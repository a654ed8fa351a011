//! Simulation Configuration
//!
//! One immutable [`GameConfig`] is built up front and borrowed by every
//! update call. Each section falls back to its defaults for missing JSON
//! fields, so a config file only needs to name what it overrides.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid config JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Player movement, health and camera tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walk speed (units/s)
    pub move_speed: f32,
    /// Sprint speed (units/s)
    pub sprint_speed: f32,
    /// Crouch-walk speed (units/s)
    pub crouch_speed: f32,
    /// Free-flight speed in god mode (units/s)
    pub god_mode_speed: f32,
    /// Initial upward velocity of a jump
    pub jump_velocity: f32,
    /// Vertical acceleration while airborne (negative is down)
    pub gravity: f32,
    /// Terminal fall velocity (negative)
    pub max_fall_speed: f32,
    /// Collision box height
    pub height: f32,
    /// Collision box half width
    pub radius: f32,
    /// Eye height above the feet
    pub eye_height: f32,
    /// Tallest ledge climbed without jumping
    pub step_height: f32,
    /// How far below the feet the ground probe reaches
    pub ground_check_distance: f32,
    /// Fraction of input speed available in the air
    pub air_control: f32,
    /// Momentum deceleration on the ground with no input (units/s^2)
    pub ground_friction: f32,
    /// Exponential momentum decay rate in the air (1/s)
    pub air_resistance: f32,
    /// Momentum speed at slide start
    pub slide_speed: f32,
    /// Momentum deceleration while sliding (units/s^2)
    pub slide_friction: f32,
    /// Longest a slide may last (s)
    pub max_slide_time: f32,
    /// Horizontal speed above which crouch starts a slide
    pub slide_trigger_speed: f32,
    /// Full health
    pub max_hp: f32,
    /// Field of view while walking (degrees)
    pub normal_fov: f32,
    /// Field of view while sprinting (degrees)
    pub sprint_fov: f32,
    /// Field of view while sliding (degrees)
    pub slide_fov: f32,
    /// FOV interpolation rate
    pub fov_transition_speed: f32,
    /// Camera drop while crouching
    pub crouch_camera_offset: f32,
    /// Camera drop while sliding
    pub slide_camera_offset: f32,
    /// Camera height interpolation rate
    pub camera_height_transition_speed: f32,
    /// Ctrl toggles crouch; when false crouch is held
    pub crouch_toggle: bool,
    /// Start in god mode
    pub enable_god_mode: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_speed: 10.0,
            crouch_speed: 2.5,
            god_mode_speed: 15.0,
            jump_velocity: 8.0,
            gravity: -20.0,
            max_fall_speed: -50.0,
            height: 1.8,
            radius: 0.3,
            eye_height: 1.6,
            step_height: 0.3,
            ground_check_distance: 0.1,
            air_control: 0.4,
            ground_friction: 25.0,
            air_resistance: 0.8,
            slide_speed: 15.0,
            slide_friction: 8.0,
            max_slide_time: 1.0,
            slide_trigger_speed: 5.0,
            max_hp: 100.0,
            normal_fov: 45.0,
            sprint_fov: 60.0,
            slide_fov: 70.0,
            fov_transition_speed: 5.0,
            crouch_camera_offset: -0.4,
            slide_camera_offset: -0.6,
            camera_height_transition_speed: 8.0,
            crouch_toggle: true,
            enable_god_mode: false,
        }
    }
}

/// Enemy agent tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Hit points at spawn
    pub max_hp: i32,
    /// Box width on X and Z
    pub width: f32,
    /// Box height
    pub height: f32,
    /// Chase speed (units/s)
    pub move_speed: f32,
    /// Horizontal distance at which chasing starts
    pub aggro_range: f32,
    /// Horizontal distance counted as melee contact
    pub touch_range: f32,
    /// Vertical acceleration while airborne
    pub gravity: f32,
    /// Terminal fall velocity (negative)
    pub max_fall_speed: f32,
    /// Ground probe depth and resting gap above the floor
    pub ground_epsilon: f32,
    /// Brushes thinner than this never block horizontally
    pub wall_thickness_epsilon: f32,
    /// Damage per second per touching enemy
    pub contact_dps: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_hp: 3,
            width: 0.6,
            height: 1.8,
            move_speed: 3.0,
            aggro_range: 15.0,
            touch_range: 1.2,
            gravity: -20.0,
            max_fall_speed: -50.0,
            ground_epsilon: 0.05,
            wall_thickness_epsilon: 0.01,
            contact_dps: 20.0,
        }
    }
}

/// Projectile weapon tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Bullet speed (units/s)
    pub bullet_speed: f32,
    /// Bullet lifetime before expiry (s)
    pub max_lifetime: f32,
    /// Minimum time between shots (s)
    pub fire_interval: f32,
    /// Damage per enemy hit
    pub damage: i32,
    /// Bullets younger than this never register hits (s)
    pub min_hit_age: f32,
    /// Muzzle offset along the view direction
    pub muzzle_forward: f32,
    /// Muzzle offset to the right
    pub muzzle_right: f32,
    /// Muzzle offset downward
    pub muzzle_down: f32,
    /// Distance of the convergence point on the view centre line
    pub aim_distance: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 65.0,
            max_lifetime: 3.0,
            fire_interval: 0.06,
            damage: 1,
            min_hit_age: 0.02,
            muzzle_forward: 0.3,
            muzzle_right: 0.2,
            muzzle_down: 0.15,
            aim_distance: 100.0,
        }
    }
}

/// Frame stepping and session setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Largest timestep a tick will integrate (s)
    pub max_dt: f32,
    /// Seed for view shake noise
    pub rng_seed: u64,
    /// Spawn point when the map has no player start
    pub default_spawn: Vec3,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_dt: crate::DEFAULT_MAX_DT,
            rng_seed: 0x5EED_F1AE,
            default_spawn: Vec3::new(0.0, 2.0, 0.0),
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player section
    pub player: PlayerConfig,
    /// Enemy section
    pub enemy: EnemyConfig,
    /// Weapon section
    pub weapon: WeaponConfig,
    /// Simulation section
    pub simulation: SimulationConfig,
}

impl GameConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
