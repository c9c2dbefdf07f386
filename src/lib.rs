//! Arkanoid Engine - a deterministic block-breaking simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state, collisions, scoring, fixed timestep)
//! - `control`: Paddle control sources (local keys or a remote agent)
//! - `session`: Glue between the frame loop, the scheduler and the control channel
//! - `frontend`: Interfaces consumed by renderers and audio (read-only)
//! - `config`: Immutable simulation configuration

pub mod config;
pub mod control;
pub mod frontend;
pub mod session;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use session::Session;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds
    pub const TICK_MS: f64 = 1.0;
    /// Accumulator cap to prevent spiral of death after a stall
    pub const MAX_ACCUMULATED_MS: f64 = 200.0;

    /// Playfield is the unit square, y grows downward
    pub const FIELD_MIN: f32 = 0.0;
    pub const FIELD_MAX: f32 = 1.0;

    /// Lives at the start of a session
    pub const INITIAL_LIVES: u32 = 3;

    /// Paddle bounce angle limit from vertical (degrees)
    pub const MAX_BOUNCE_ANGLE_DEG: f32 = 60.0;

    /// Allowed triangle block rotations (degrees)
    pub const TRIANGLE_ROTATIONS: [f32; 6] = [0.0, 60.0, 120.0, 180.0, 240.0, 300.0];

    /// Speeds below this are treated as zero when rescaling velocity
    pub const SPEED_EPSILON: f32 = 1e-6;
}

/// Rotate `point` around `center` by `degrees` (screen coordinates, y down)
#[inline]
pub fn rotate_point(point: Vec2, center: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    Vec2::new(cos * d.x + sin * d.y, cos * d.y - sin * d.x) + center
}

/// Rescale `vel` to `speed`, or fall back to `fallback` when `vel` has no direction
#[inline]
pub fn with_speed(vel: Vec2, speed: f32, fallback: Vec2) -> Vec2 {
    let current = vel.length();
    if current < consts::SPEED_EPSILON {
        fallback
    } else {
        vel * (speed / current)
    }
}

/// Clamp the magnitude of `vel` to `max_speed`
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    if vel.length() > max_speed {
        with_speed(vel, max_speed, vel)
    } else {
        vel
    }
}
