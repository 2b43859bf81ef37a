//! Data-driven game balance
//!
//! Mirrors the physics and gameplay constants in [`crate::consts`]. Values can
//! be overridden from JSON; missing keys fall back to the compile-time
//! defaults, so a tuning file only needs the values being changed.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Runtime-tunable physics and gameplay values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Field
    pub g_constant: f32,
    pub min_gravity_dist: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub debris_field_factor: f32,

    // Bounces
    pub wall_restitution: f32,
    pub boundary_restitution: f32,

    // Wells
    pub max_wells: usize,
    pub default_strength: f32,
    pub min_strength: f32,
    pub max_strength: f32,
    pub strength_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            g_constant: G_CONSTANT,
            min_gravity_dist: MIN_GRAVITY_DIST,
            max_force: MAX_FORCE,
            max_speed: MAX_SPEED,
            debris_field_factor: DEBRIS_FIELD_FACTOR,

            wall_restitution: WALL_RESTITUTION,
            boundary_restitution: BOUNDARY_RESTITUTION,

            max_wells: MAX_WELLS,
            default_strength: DEFAULT_STRENGTH,
            min_strength: MIN_STRENGTH,
            max_strength: MAX_STRENGTH,
            strength_step: STRENGTH_STEP,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning override
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_gravity_dist <= 0.0 {
            return Err(ConfigError::InvalidTuning(
                "min_gravity_dist must be positive".into(),
            ));
        }
        if self.default_strength <= 0.0 {
            return Err(ConfigError::InvalidTuning(
                "default_strength must be positive".into(),
            ));
        }
        if self.min_strength <= 0.0 || self.min_strength > self.max_strength {
            return Err(ConfigError::InvalidTuning(format!(
                "strength bounds [{}, {}] are not a valid range",
                self.min_strength, self.max_strength
            )));
        }
        if self.max_force < 0.0 || self.max_speed <= 0.0 {
            return Err(ConfigError::InvalidTuning(
                "max_force and max_speed must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a signed strength into the configured magnitude bounds
    #[inline]
    pub fn clamp_strength(&self, strength: f32) -> f32 {
        crate::clamp_magnitude(strength, self.min_strength, self.max_strength)
    }
}
