//! Error types
//!
//! Only configuration and storage can fail. Steady-state simulation never
//! returns an error.

use thiserror::Error;

/// Level table or tuning data that can't be used
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The level table is empty
    #[error("level table contains no levels")]
    NoLevels,

    /// A level has no goal position
    #[error("level {level} has no goal")]
    MissingGoal { level: usize },

    /// A level is present but its contents are unusable
    #[error("level {level} is invalid: {reason}")]
    InvalidLevel { level: usize, reason: String },

    /// Tuning values outside their usable range
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// Malformed JSON
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// High score store failures. Callers log and continue.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage is missing or disabled (private browsing, no window)
    #[error("storage unavailable")]
    Unavailable,

    /// The backend rejected the operation (quota exceeded, security error)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}
