//! Raw device events to domain actions
//!
//! Device coordinates are canvas-relative CSS pixels. They are mapped into the
//! logical playfield with a cached per-axis scale, recomputed only on resize.

use glam::Vec2;

use crate::consts::*;
use crate::sim::InputAction;

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl PointerButton {
    /// From a DOM `MouseEvent.button` value
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

/// A raw event captured by the host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, button: PointerButton },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32, button: PointerButton },
    /// Wheel scroll; negative is scroll up
    Wheel { delta_y: f32 },
    /// `x`/`y` are the first touch, `touches` the number of active touches
    TouchStart { x: f32, y: f32, touches: u32, time_ms: f64 },
    TouchMove { x: f32, y: f32 },
    TouchEnd { touches: u32 },
    KeyDown { key: String },
    /// Displayed canvas size changed
    Resize { width: f32, height: f32 },
    /// On-screen restart button
    RestartRequest,
    /// Page hidden or window blurred
    FocusLost,
}

/// Logical-per-displayed pixel ratio on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceScale {
    pub x: f32,
    pub y: f32,
}

impl SurfaceScale {
    /// Scale for a displayed size; `None` if the surface has no area
    pub fn new(displayed_width: f32, displayed_height: f32) -> Option<Self> {
        if displayed_width <= 0.0 || displayed_height <= 0.0 {
            return None;
        }
        Some(Self {
            x: CANVAS_WIDTH / displayed_width,
            y: CANVAS_HEIGHT / displayed_height,
        })
    }

    #[inline]
    pub fn to_logical(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x * self.x, y * self.y)
    }
}

/// Stateful translator from [`InputEvent`] to [`InputAction`]
#[derive(Debug, Clone, Default)]
pub struct InputController {
    scale: Option<SurfaceScale>,
    /// Last known pointer position (logical)
    hover: Option<Vec2>,
    /// Position and time of the previous single tap
    last_tap: Option<(Vec2, f64)>,
}

impl InputController {
    pub fn new(displayed_width: f32, displayed_height: f32) -> Self {
        Self {
            scale: SurfaceScale::new(displayed_width, displayed_height),
            ..Default::default()
        }
    }

    pub fn scale(&self) -> Option<SurfaceScale> {
        self.scale
    }

    pub fn hover(&self) -> Option<Vec2> {
        self.hover
    }

    fn logical(&self, x: f32, y: f32) -> Option<Vec2> {
        self.scale.map(|s| s.to_logical(x, y))
    }

    /// Translate one event. Position events are dropped while the surface
    /// has no area.
    pub fn handle(&mut self, event: InputEvent) -> Option<InputAction> {
        match event {
            InputEvent::Resize { width, height } => {
                self.scale = SurfaceScale::new(width, height);
                if self.scale.is_none() {
                    log::debug!("Surface is {}x{}, input suspended", width, height);
                }
                None
            }
            InputEvent::PointerDown { x, y, button } => {
                let p = self.logical(x, y)?;
                self.hover = Some(p);
                match button {
                    PointerButton::Primary => Some(InputAction::Primary(p)),
                    PointerButton::Secondary => Some(InputAction::Secondary(p)),
                    PointerButton::Other => None,
                }
            }
            InputEvent::PointerMove { x, y } | InputEvent::TouchMove { x, y } => {
                self.hover = Some(self.logical(x, y)?);
                None
            }
            InputEvent::PointerUp { .. } | InputEvent::TouchEnd { .. } => None,
            InputEvent::Wheel { delta_y } => {
                let at = self.hover?;
                if delta_y == 0.0 {
                    return None;
                }
                let steps = if delta_y < 0.0 { 1 } else { -1 };
                Some(InputAction::AdjustStrength { at, steps })
            }
            InputEvent::TouchStart {
                x,
                y,
                touches,
                time_ms,
            } => {
                if touches >= 2 {
                    self.last_tap = None;
                    return Some(InputAction::TogglePause);
                }
                let p = self.logical(x, y)?;
                self.hover = Some(p);
                let is_double = self.last_tap.is_some_and(|(prev, t)| {
                    time_ms - t <= DOUBLE_TAP_MS && prev.distance(p) <= DOUBLE_TAP_RADIUS
                });
                if is_double {
                    self.last_tap = None;
                    Some(InputAction::DoubleTap(p))
                } else {
                    self.last_tap = Some((p, time_ms));
                    Some(InputAction::Primary(p))
                }
            }
            InputEvent::KeyDown { key } => match key.as_str() {
                "Escape" | "p" | "P" => Some(InputAction::TogglePause),
                "Enter" | " " => Some(InputAction::Confirm),
                "r" | "R" => Some(InputAction::Restart),
                _ => None,
            },
            InputEvent::RestartRequest => Some(InputAction::Restart),
            InputEvent::FocusLost => Some(InputAction::Pause),
        }
    }
}
