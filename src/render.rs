//! Render snapshots
//!
//! The simulation never draws. Each frame the loop builds a [`RenderSnapshot`]
//! (plain shapes in playfield coordinates plus HUD values) and hands it to
//! whatever [`RenderSurface`] the host has.

use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;

use crate::consts::*;
use crate::sim::{GameMachine, GamePhase, Well, field_at};
use crate::tuning::Tuning;

/// RGBA, 0..1
pub type Color = [f32; 4];

/// Palette
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.02, 0.02, 0.05, 1.0];
    pub const WALL: Color = [0.3, 0.3, 0.4, 1.0];
    pub const HUD_BAND: Color = [0.05, 0.05, 0.1, 0.85];
    pub const GOAL: Color = [0.3, 1.0, 0.5, 1.0];
    pub const GOAL_CORE: Color = [0.3, 1.0, 0.5, 0.25];
    pub const COLLECTIBLE: Color = [0.9, 0.85, 0.3, 1.0];
    pub const ATTRACTOR: Color = [0.4, 0.7, 1.0, 1.0];
    pub const REPULSOR: Color = [1.0, 0.4, 0.3, 1.0];
    pub const DEBRIS: Color = [0.55, 0.45, 0.4, 1.0];
    pub const PARTICLE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const TRAIL: Color = [0.6, 0.8, 1.0, 0.8];
    pub const FIELD: Color = [0.5, 0.5, 0.8, 0.35];
    pub const OVERLAY: Color = [0.0, 0.0, 0.0, 0.5];
}

/// A primitive in playfield coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Ring {
        center: Vec2,
        radius: f32,
        thickness: f32,
        color: Color,
    },
    Rect {
        min: Vec2,
        max: Vec2,
        color: Color,
    },
    /// Convex outline, drawn as a fan
    Polygon { points: Vec<Vec2>, color: Color },
    /// Polyline, newest point first; fades toward the tail
    Trail {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
}

/// Values for the HUD overlay
#[derive(Debug, Clone, PartialEq)]
pub struct HudData {
    pub score: u64,
    pub high_score: u64,
    pub new_high_score: bool,
    /// One-based level number
    pub level: usize,
    pub level_name: String,
    pub wells_left: usize,
    pub phase: GamePhase,
    pub paused: bool,
    /// Score of the level just completed, shown on the level-complete screen
    pub level_score: Option<u64>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub shapes: Vec<Shape>,
    pub hud: HudData,
}

/// Which optional layers to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub trails: bool,
    pub field_preview: bool,
    /// Skip animated effects (well pulse)
    pub reduced_motion: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            trails: true,
            field_preview: false,
            reduced_motion: false,
        }
    }
}

/// A drawing backend
pub trait RenderSurface {
    fn draw(&mut self, snapshot: &RenderSnapshot);
}

static MISSING_SURFACE_WARNED: AtomicBool = AtomicBool::new(false);

/// Hand a snapshot to the surface. Without a surface this does nothing and
/// warns once.
pub fn render(surface: Option<&mut dyn RenderSurface>, snapshot: &RenderSnapshot) {
    match surface {
        Some(surface) => surface.draw(snapshot),
        None => {
            if !MISSING_SURFACE_WARNED.swap(true, Ordering::Relaxed) {
                log::warn!("No render surface; frames will not be drawn");
            }
        }
    }
}

fn well_color(well: &Well) -> Color {
    if well.is_attractor() {
        colors::ATTRACTOR
    } else {
        colors::REPULSOR
    }
}

/// Field preview: short strokes on a grid, pointing along the field
fn field_strokes(wells: &[Well], tuning: &Tuning, shapes: &mut Vec<Shape>) {
    const SPACING: f32 = 50.0;
    const MAX_STROKE: f32 = 18.0;

    let mut y = HUD_HEIGHT + SPACING / 2.0;
    while y < CANVAS_HEIGHT {
        let mut x = SPACING / 2.0;
        while x < CANVAS_WIDTH {
            let p = Vec2::new(x, y);
            let f = field_at(p, wells, tuning);
            let len = (f.length() / tuning.max_force).min(1.0) * MAX_STROKE;
            if len > 1.0 {
                shapes.push(Shape::Trail {
                    points: vec![p + f.normalize_or_zero() * len, p],
                    width: 1.5,
                    color: colors::FIELD,
                });
            }
            x += SPACING;
        }
        y += SPACING;
    }
}

/// Build the frame snapshot for the current machine state
pub fn build_snapshot(machine: &GameMachine, options: SnapshotOptions) -> RenderSnapshot {
    let bodies = machine.bodies();
    let session = machine.session();
    let mut shapes = Vec::new();

    if options.field_preview && !bodies.wells.is_empty() {
        field_strokes(&bodies.wells, machine.tuning(), &mut shapes);
    }

    for wall in &bodies.walls {
        shapes.push(Shape::Rect {
            min: wall.min(),
            max: wall.max(),
            color: colors::WALL,
        });
    }

    shapes.push(Shape::Circle {
        center: bodies.goal.pos,
        radius: bodies.goal.radius,
        color: colors::GOAL_CORE,
    });
    shapes.push(Shape::Ring {
        center: bodies.goal.pos,
        radius: bodies.goal.radius,
        thickness: 3.0,
        color: colors::GOAL,
    });

    for c in bodies.collectibles.iter().filter(|c| !c.collected) {
        shapes.push(Shape::Circle {
            center: c.pos,
            radius: c.radius,
            color: colors::COLLECTIBLE,
        });
    }

    for well in &bodies.wells {
        let color = well_color(well);
        // Bigger wells draw bigger
        let radius = WELL_RADIUS * (0.75 + 0.25 * well.strength.abs() / DEFAULT_STRENGTH);
        shapes.push(Shape::Circle {
            center: well.pos,
            radius,
            color,
        });
        if !options.reduced_motion {
            let pulse = 0.5 + 0.5 * well.phase.sin();
            shapes.push(Shape::Ring {
                center: well.pos,
                radius: radius * (1.5 + pulse),
                thickness: 1.5,
                color: [color[0], color[1], color[2], 0.5 * (1.0 - pulse)],
            });
        }
    }

    for debris in &bodies.debris {
        shapes.push(Shape::Polygon {
            points: debris.world_outline(),
            color: colors::DEBRIS,
        });
    }

    let particle = &bodies.particle;
    if options.trails && particle.trail.len() >= 2 {
        shapes.push(Shape::Trail {
            points: particle.trail.iter().map(|t| t.pos).collect(),
            width: particle.radius * 0.8,
            color: colors::TRAIL,
        });
    }
    shapes.push(Shape::Circle {
        center: particle.pos,
        radius: particle.radius,
        color: colors::PARTICLE,
    });

    shapes.push(Shape::Rect {
        min: Vec2::ZERO,
        max: Vec2::new(CANVAS_WIDTH, HUD_HEIGHT),
        color: colors::HUD_BAND,
    });

    if session.paused || session.phase != GamePhase::Playing {
        shapes.push(Shape::Rect {
            min: Vec2::ZERO,
            max: Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            color: colors::OVERLAY,
        });
    }

    RenderSnapshot {
        shapes,
        hud: HudData {
            score: session.score,
            high_score: session.high_score,
            new_high_score: session.new_high_score,
            level: session.level_index + 1,
            level_name: machine.level_name().to_string(),
            wells_left: machine.wells_left(),
            phase: session.phase,
            paused: session.paused,
            level_score: session.last_level.map(|b| b.total),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::{InputAction, LevelTable};

    fn machine() -> GameMachine {
        GameMachine::new(
            LevelTable::builtin(),
            Tuning::default(),
            Box::new(MemoryStore::new()),
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        frames: usize,
    }

    impl RenderSurface for Recorder {
        fn draw(&mut self, _snapshot: &RenderSnapshot) {
            self.frames += 1;
        }
    }

    #[test]
    fn test_render_without_surface_is_noop() {
        let snapshot = build_snapshot(&machine(), SnapshotOptions::default());
        render(None, &snapshot);
        render(None, &snapshot);
    }

    #[test]
    fn test_render_hands_snapshot_to_surface() {
        let snapshot = build_snapshot(&machine(), SnapshotOptions::default());
        let mut recorder = Recorder::default();
        render(Some(&mut recorder), &snapshot);
        assert_eq!(recorder.frames, 1);
    }

    #[test]
    fn test_snapshot_hud_and_overlay() {
        let mut m = machine();
        let menu = build_snapshot(&m, SnapshotOptions::default());
        assert_eq!(menu.hud.phase, GamePhase::Menu);
        assert_eq!(menu.hud.level, 1);
        assert_eq!(menu.hud.level_name, "First Pull");
        assert!(matches!(menu.shapes.last(), Some(Shape::Rect { color, .. }) if *color == colors::OVERLAY));

        m.apply(InputAction::Confirm);
        m.apply(InputAction::Primary(Vec2::new(400.0, 500.0)));
        let playing = build_snapshot(&m, SnapshotOptions::default());
        assert_eq!(playing.hud.wells_left, MAX_WELLS - 1);
        assert!(!matches!(playing.shapes.last(), Some(Shape::Rect { color, .. }) if *color == colors::OVERLAY));
        assert!(playing.shapes.iter().any(
            |s| matches!(s, Shape::Circle { color, .. } if *color == colors::ATTRACTOR)
        ));
    }

    #[test]
    fn test_field_preview_only_with_wells() {
        let mut m = machine();
        let options = SnapshotOptions {
            field_preview: true,
            ..Default::default()
        };
        let empty = build_snapshot(&m, options);
        assert!(!empty.shapes.iter().any(
            |s| matches!(s, Shape::Trail { color, .. } if *color == colors::FIELD)
        ));

        m.apply(InputAction::Confirm);
        m.apply(InputAction::Primary(Vec2::new(400.0, 500.0)));
        let with_well = build_snapshot(&m, options);
        assert!(with_well.shapes.iter().any(
            |s| matches!(s, Shape::Trail { color, .. } if *color == colors::FIELD)
        ));
    }
}
