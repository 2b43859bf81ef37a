//! Outbound events
//!
//! The core never reads these back. [`GameEvent`]s are drained by the host
//! for site-wide stats; [`Cue`]s drive sound and screen feedback.

use serde::{Deserialize, Serialize};

/// Lifecycle event for the stats/achievement subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStart {
        game_id: String,
    },
    GameEnd {
        game_id: String,
        score: u64,
        /// True when the final level was cleared
        completed: bool,
        /// Zero-based index of the level the game ended on
        level: usize,
    },
    LevelComplete {
        game_id: String,
        level: usize,
        score: u64,
    },
}

/// Short feedback cue raised by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    WellPlaced { attractor: bool },
    WellRemoved,
    WellAdjusted,
    PlacementRejected,
    Collected,
    Bounce,
    GoalReached,
    Struck,
    NewHighScore,
}
