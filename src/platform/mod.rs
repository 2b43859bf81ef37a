//! Platform abstraction layer
//!
//! Translates host (browser) events into simulation actions. Nothing in here
//! touches web-sys, so it runs the same under native tests.

pub mod input;

pub use input::{InputController, InputEvent, PointerButton, SurfaceScale};
