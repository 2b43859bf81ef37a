//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (debris outlines)
//! - Stable iteration order (insertion order of bodies)
//! - No rendering or platform dependencies

pub mod bodies;
pub mod collision;
pub mod events;
pub mod field;
pub mod level;
pub mod machine;
pub mod scoring;

pub use bodies::{
    BodyRegistry, Collectible, Debris, Goal, Particle, PlacementRejection, Trail, TrailPoint,
    Wall, Well,
};
pub use collision::{CollisionResult, Contact, circles_touch, detect_contacts, resolve_bounds, resolve_wall};
pub use events::{Cue, GameEvent};
pub use field::{apply_forces, field_at, integrate};
pub use level::{DebrisConfig, LevelConfig, LevelTable};
pub use machine::{GameMachine, GamePhase, GameSession, InputAction, Trigger, transition};
pub use scoring::{ScoreBreakdown, level_score};
