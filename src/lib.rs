//! Crater Duel - deterministic two-team artillery engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, ballistics, damage, turn machine, replay)
//! - `settings`: Match configuration

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, MatchSettings, TerrainSettings};

use glam::Vec2;

/// Engine constants
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Physics steps per second, for step <-> millisecond conversion
    pub const SIM_HZ: u64 = 60;
    /// Hard cap on trajectory integration steps
    pub const MAX_SIM_STEPS: u32 = 2000;

    /// Unit collision box (feet at the unit position, centered horizontally)
    pub const UNIT_WIDTH: f32 = 32.0;
    pub const UNIT_HEIGHT: f32 = 24.0;
    /// Projectile radius, added to unit boxes for segment tests
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    /// Travel distance before a shot can hit units (keeps the shooter safe at launch)
    pub const GRACE_RADIUS: f32 = 40.0;

    /// Bounce handling
    pub const BOUNCE_EPSILON: f32 = 1.0;
    pub const MIN_BOUNCE_SPEED: f32 = 20.0;

    /// Damage curve: full damage inside this distance
    pub const FULL_DAMAGE_DISTANCE: f32 = 5.0;
    /// Falloff reaches 20% at the explosion radius
    pub const DAMAGE_FALLOFF: f32 = 80.0;
    /// Knockback displacement at 100% damage with multiplier 1
    pub const BASE_KNOCKBACK: f32 = 50.0;
    pub const KNOCKBACK_DURATION_MS: u64 = 300;
    /// Presentation speed for settle falls (pixels per second)
    pub const FALL_SPEED: f32 = 400.0;

    /// Aim limits (degrees, 0 = right, 90 = up)
    pub const MIN_AIM_ANGLE: f32 = 5.0;
    pub const MAX_AIM_ANGLE: f32 = 175.0;

    /// Walking
    pub const MOVE_STEP: f32 = 2.0;
    pub const MAX_STEP_UP: f32 = 3.0;
    pub const SLOPE_BASELINE: f32 = 8.0;
    pub const MAX_SLOPE_DEG: f32 = 60.0;

    /// Jumping
    pub const JUMP_DX: f32 = 50.0;
    pub const JUMP_APEX: f32 = 30.0;
    pub const JUMP_STEPS: u32 = 20;
    pub const JUMP_DURATION_MS: u64 = 500;
}

/// Unit vector for an aim angle in degrees, screen space (y grows downward)
#[inline]
pub fn aim_direction(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Convert physics steps to whole milliseconds
#[inline]
pub fn steps_to_ms(steps: u32) -> u64 {
    u64::from(steps) * 1000 / consts::SIM_HZ
}

/// Convert milliseconds to the last physics step that has elapsed
#[inline]
pub fn ms_to_steps(ms: u64) -> u64 {
    ms * consts::SIM_HZ / 1000
}
