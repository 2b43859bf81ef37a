//! Bodies and the per-level body registry
//!
//! Everything the simulation mutates lives in [`BodyRegistry`]. It is rebuilt
//! from a [`LevelConfig`] on every level load and dropped on transition.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{DebrisConfig, LevelConfig};
use crate::consts::*;
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Axis-aligned rectangular wall (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Wall {
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Whether a circle overlaps the rectangle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        (center - self.closest_point(center)).length_squared() < radius * radius
    }
}

/// Trail point for particle rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// Fixed-capacity ring buffer of recent positions (newest first)
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a point, evicting the oldest when full
    pub fn push(&mut self, point: TrailPoint) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_back();
        }
        self.points.push_front(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

/// The controlled body
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Trail history for rendering
    pub trail: Trail,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            radius: PARTICLE_RADIUS,
            trail: Trail::with_capacity(TRAIL_CAPACITY),
        }
    }

    /// Record current position to trail (call each simulated tick)
    pub fn record_trail(&mut self) {
        let speed = self.vel.length();
        self.trail.push(TrailPoint {
            pos: self.pos,
            speed,
        });
    }
}

/// A tumbling obstacle; touching it ends the level
#[derive(Debug, Clone)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub rotation: f32,
    /// Radians per frame
    pub spin: f32,
    /// Irregular outline in local space, generated once at spawn
    pub outline: Vec<Vec2>,
}

impl Debris {
    /// Spawn debris with an outline drawn from `rng`
    pub fn spawn(config: &DebrisConfig, rng: &mut Pcg32) -> Self {
        let vertex_count = rng.random_range(DEBRIS_MIN_VERTICES..DEBRIS_MAX_VERTICES);
        let step = std::f32::consts::TAU / vertex_count as f32;
        let outline = (0..vertex_count)
            .map(|i| {
                let angle = i as f32 * step + rng.random_range(-0.25f32..0.25) * step;
                let r = config.radius * rng.random_range(0.7f32..1.0);
                Vec2::new(angle.cos(), angle.sin()) * r
            })
            .collect();

        Self {
            pos: config.position,
            vel: config.velocity,
            radius: config.radius,
            rotation: 0.0,
            spin: config.spin,
            outline,
        }
    }

    /// Outline rotated and translated into world space
    pub fn world_outline(&self) -> Vec<Vec2> {
        let rot = Vec2::from_angle(self.rotation);
        self.outline
            .iter()
            .map(|&p| self.pos + rot.rotate(p))
            .collect()
    }
}

/// A player-placed force source. Positive strength attracts, negative repels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Well {
    pub id: u32,
    pub pos: Vec2,
    pub strength: f32,
    /// Render-only pulse phase
    pub phase: f32,
}

impl Well {
    #[inline]
    pub fn is_attractor(&self) -> bool {
        self.strength >= 0.0
    }
}

/// Level exit
#[derive(Debug, Clone, Copy)]
pub struct Goal {
    pub pos: Vec2,
    pub radius: f32,
}

/// One-shot pickup
#[derive(Debug, Clone, Copy)]
pub struct Collectible {
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl Collectible {
    /// Mark collected; returns true only the first time
    pub fn collect(&mut self) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }
}

/// Why a well placement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    TooManyWells,
    OverlapsWall,
    OverlapsHud,
    OutOfBounds,
}

/// All bodies of the active level
#[derive(Debug, Clone)]
pub struct BodyRegistry {
    pub particle: Particle,
    pub debris: Vec<Debris>,
    pub wells: Vec<Well>,
    pub walls: Vec<Wall>,
    pub goal: Goal,
    pub collectibles: Vec<Collectible>,
    next_well_id: u32,
}

impl BodyRegistry {
    /// Build the bodies for level `index`
    pub fn from_level(level: &LevelConfig, index: usize) -> Result<Self, ConfigError> {
        let goal = level.goal.ok_or(ConfigError::MissingGoal { level: index })?;

        let mut rng = Pcg32::seed_from_u64(level.seed);
        let debris = level
            .debris
            .iter()
            .map(|d| Debris::spawn(d, &mut rng))
            .collect();

        let collectibles = level
            .collectibles
            .iter()
            .map(|&pos| Collectible {
                pos,
                radius: COLLECTIBLE_RADIUS,
                collected: false,
            })
            .collect();

        Ok(Self {
            particle: Particle::new(level.start, level.drift),
            debris,
            wells: Vec::new(),
            walls: level.walls.clone(),
            goal: Goal {
                pos: goal,
                radius: GOAL_RADIUS,
            },
            collectibles,
            next_well_id: 1,
        })
    }

    /// Index of the well nearest to `pos` within click range
    pub fn well_at(&self, pos: Vec2) -> Option<usize> {
        self.wells
            .iter()
            .enumerate()
            .map(|(i, w)| (i, w.pos.distance_squared(pos)))
            .filter(|&(_, d2)| d2 <= WELL_HIT_RADIUS * WELL_HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Check whether a well may be placed at `pos`
    pub fn check_placement(&self, pos: Vec2, tuning: &Tuning) -> Result<(), PlacementRejection> {
        if self.wells.len() >= tuning.max_wells {
            return Err(PlacementRejection::TooManyWells);
        }
        if pos.x < WELL_RADIUS
            || pos.x > CANVAS_WIDTH - WELL_RADIUS
            || pos.y > CANVAS_HEIGHT - WELL_RADIUS
        {
            return Err(PlacementRejection::OutOfBounds);
        }
        if pos.y - WELL_RADIUS < HUD_HEIGHT {
            return Err(PlacementRejection::OverlapsHud);
        }
        if self.walls.iter().any(|w| w.overlaps_circle(pos, WELL_RADIUS)) {
            return Err(PlacementRejection::OverlapsWall);
        }
        Ok(())
    }

    /// Place a well with a signed strength; returns its id
    pub fn place_well(
        &mut self,
        pos: Vec2,
        strength: f32,
        tuning: &Tuning,
    ) -> Result<u32, PlacementRejection> {
        self.check_placement(pos, tuning)?;
        let id = self.next_well_id;
        self.next_well_id += 1;
        self.wells.push(Well {
            id,
            pos,
            strength: tuning.clamp_strength(strength),
            phase: 0.0,
        });
        Ok(id)
    }

    pub fn remove_well(&mut self, index: usize) -> Well {
        self.wells.remove(index)
    }

    /// Step a well's magnitude by `steps` increments, keeping polarity
    pub fn adjust_well(&mut self, index: usize, steps: i32, tuning: &Tuning) -> Option<f32> {
        let well = self.wells.get_mut(index)?;
        let sign = if well.is_attractor() { 1.0 } else { -1.0 };
        let magnitude = well.strength.abs() + steps as f32 * tuning.strength_step;
        well.strength = sign * magnitude.clamp(tuning.min_strength, tuning.max_strength);
        Some(well.strength)
    }

    /// Flip a well to repel with the same magnitude
    pub fn make_repulsor(&mut self, index: usize) {
        if let Some(well) = self.wells.get_mut(index) {
            well.strength = -well.strength.abs();
        }
    }

    pub fn well_index_by_id(&self, id: u32) -> Option<usize> {
        self.wells.iter().position(|w| w.id == id)
    }

    pub fn collected_count(&self) -> u32 {
        self.collectibles.iter().filter(|c| c.collected).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelTable;
    use proptest::prelude::*;

    fn registry() -> BodyRegistry {
        let table = LevelTable::builtin();
        BodyRegistry::from_level(table.get(0).unwrap(), 0).unwrap()
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut trail = Trail::with_capacity(3);
        for i in 0..10 {
            trail.push(TrailPoint {
                pos: Vec2::new(i as f32, 0.0),
                speed: 1.0,
            });
        }
        assert_eq!(trail.len(), 3);
        // Newest first
        assert_eq!(trail.iter().next().unwrap().pos.x, 9.0);
    }

    #[test]
    fn test_debris_outline_is_deterministic() {
        let config = DebrisConfig {
            position: Vec2::new(100.0, 100.0),
            velocity: Vec2::ZERO,
            radius: 20.0,
            spin: 0.0,
        };
        let a = Debris::spawn(&config, &mut Pcg32::seed_from_u64(7));
        let b = Debris::spawn(&config, &mut Pcg32::seed_from_u64(7));
        assert_eq!(a.outline, b.outline);
        assert!(a.outline.len() >= DEBRIS_MIN_VERTICES);
        assert!(a.outline.iter().all(|p| p.length() <= config.radius + 1e-3));
    }

    #[test]
    fn test_well_cap_enforced() {
        let mut reg = registry();
        let tuning = Tuning::default();
        for i in 0..tuning.max_wells {
            let pos = Vec2::new(100.0 + i as f32 * 60.0, 500.0);
            assert!(reg.place_well(pos, 100.0, &tuning).is_ok());
        }
        assert_eq!(
            reg.place_well(Vec2::new(500.0, 100.0), 100.0, &tuning),
            Err(PlacementRejection::TooManyWells)
        );
        assert_eq!(reg.wells.len(), tuning.max_wells);
    }

    #[test]
    fn test_placement_rejects_hud_and_walls() {
        let mut reg = registry();
        let tuning = Tuning::default();
        reg.walls.push(Wall {
            x: 300.0,
            y: 300.0,
            w: 50.0,
            h: 50.0,
        });
        assert_eq!(
            reg.check_placement(Vec2::new(400.0, 20.0), &tuning),
            Err(PlacementRejection::OverlapsHud)
        );
        assert_eq!(
            reg.check_placement(Vec2::new(320.0, 290.0), &tuning),
            Err(PlacementRejection::OverlapsWall)
        );
        assert_eq!(
            reg.check_placement(Vec2::new(-5.0, 200.0), &tuning),
            Err(PlacementRejection::OutOfBounds)
        );
        assert!(reg.check_placement(Vec2::new(500.0, 500.0), &tuning).is_ok());
    }

    #[test]
    fn test_well_at_picks_nearest() {
        let mut reg = registry();
        let tuning = Tuning::default();
        reg.place_well(Vec2::new(300.0, 300.0), 100.0, &tuning).unwrap();
        reg.place_well(Vec2::new(330.0, 300.0), 100.0, &tuning).unwrap();
        assert_eq!(reg.well_at(Vec2::new(325.0, 300.0)), Some(1));
        assert_eq!(reg.well_at(Vec2::new(600.0, 300.0)), None);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let mut c = Collectible {
            pos: Vec2::ZERO,
            radius: 8.0,
            collected: false,
        };
        assert!(c.collect());
        assert!(!c.collect());
        assert!(c.collected);
    }

    proptest! {
        #[test]
        fn strength_stays_in_bounds(
            initial in -1000.0f32..1000.0,
            steps in prop::collection::vec(-40i32..40, 0..30),
        ) {
            let tuning = Tuning::default();
            let mut reg = registry();
            if reg.place_well(Vec2::new(400.0, 300.0), initial, &tuning).is_ok() {
                for s in steps {
                    reg.adjust_well(0, s, &tuning);
                    let magnitude = reg.wells[0].strength.abs();
                    prop_assert!(magnitude >= tuning.min_strength);
                    prop_assert!(magnitude <= tuning.max_strength);
                }
            }
        }

        #[test]
        fn adjust_preserves_polarity(initial in 25.0f32..300.0, steps in -50i32..50) {
            let tuning = Tuning::default();
            let mut reg = registry();
            reg.place_well(Vec2::new(400.0, 300.0), -initial, &tuning).unwrap();
            reg.adjust_well(0, steps, &tuning);
            prop_assert!(reg.wells[0].strength < 0.0);
        }

        #[test]
        fn well_count_never_exceeds_cap(
            points in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 0..40),
        ) {
            let tuning = Tuning::default();
            let mut reg = registry();
            for (x, y) in points {
                let _ = reg.place_well(Vec2::new(x, y), 100.0, &tuning);
                prop_assert!(reg.wells.len() <= tuning.max_wells);
            }
        }
    }
}
