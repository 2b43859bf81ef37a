//! Gravity Well - a gravity-field puzzle game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, force field, collisions, state machine)
//! - `game_loop`: Fixed-timestep scheduler with a per-tick input queue
//! - `platform`: Browser input translation
//! - `render`: Render snapshots handed to a drawing surface
//! - `renderer`: WebGPU implementation of the drawing surface
//! - `persistence`: High score storage adapters
//! - `tuning`: Data-driven game balance
//! - `audio`: Sound cues (Web Audio player on wasm)

pub mod audio;
pub mod error;
pub mod game_loop;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, StoreError};
pub use game_loop::GameLoop;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Identifier reported to the site-wide stats/achievement subsystem
pub const GAME_ID: &str = "gravity-well";

/// Game configuration constants
///
/// Simulation time is measured in 60 Hz frames, so velocities are px/frame
/// and accelerations px/frame². These are gameplay-tuned values.
pub mod consts {
    /// Simulation timestep in frames
    pub const SIM_DT: f32 = 1.0;
    /// Wall-clock length of one simulation step (seconds)
    pub const STEP_SECONDS: f32 = 1.0 / 60.0;
    /// Ticks per second, used by the time bonus
    pub const TICKS_PER_SECOND: u64 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Logical playfield dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// HUD band along the top edge; wells can't be placed under it
    pub const HUD_HEIGHT: f32 = 40.0;

    /// Wells
    pub const MAX_WELLS: usize = 5;
    pub const DEFAULT_STRENGTH: f32 = 100.0;
    pub const MIN_STRENGTH: f32 = 25.0;
    pub const MAX_STRENGTH: f32 = 300.0;
    pub const STRENGTH_STEP: f32 = 10.0;
    pub const WELL_RADIUS: f32 = 12.0;
    /// Clicks within this distance of a well target that well
    pub const WELL_HIT_RADIUS: f32 = 20.0;
    /// Render-only pulse speed (radians per frame)
    pub const WELL_PULSE_RATE: f32 = 0.08;

    /// Field
    pub const G_CONSTANT: f32 = 1000.0;
    pub const MIN_GRAVITY_DIST: f32 = 30.0;
    pub const MAX_FORCE: f32 = 0.5;
    pub const MAX_SPEED: f32 = 6.0;
    /// Debris feel the field at a fraction of full strength
    pub const DEBRIS_FIELD_FACTOR: f32 = 0.5;

    /// Bounces
    pub const WALL_RESTITUTION: f32 = 0.5;
    pub const BOUNDARY_RESTITUTION: f32 = 0.6;

    /// Bodies
    pub const PARTICLE_RADIUS: f32 = 6.0;
    pub const TRAIL_CAPACITY: usize = 30;
    pub const GOAL_RADIUS: f32 = 20.0;
    pub const COLLECTIBLE_RADIUS: f32 = 8.0;
    pub const DEBRIS_MIN_VERTICES: usize = 7;
    pub const DEBRIS_MAX_VERTICES: usize = 11;

    /// Scoring
    pub const LEVEL_BASE_SCORE: u64 = 1000;
    pub const COLLECTIBLE_SCORE: u64 = 200;
    pub const TIME_BONUS_MAX: u64 = 500;
    pub const EFFICIENCY_BASE: u64 = 4;

    /// Touch
    pub const DOUBLE_TAP_MS: f64 = 300.0;
    pub const DOUBLE_TAP_RADIUS: f32 = 24.0;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Linear interpolation between two points
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Scale a vector down so its length never exceeds `max`
#[inline]
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Clamp a signed value's magnitude into `[min, max]`, keeping its sign
#[inline]
pub fn clamp_magnitude(value: f32, min: f32, max: f32) -> f32 {
    let magnitude = value.abs().clamp(min, max);
    if value < 0.0 { -magnitude } else { magnitude }
}
