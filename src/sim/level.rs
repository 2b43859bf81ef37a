//! Level configuration table
//!
//! Levels are immutable input to level construction. The table is validated
//! once when it is loaded; a malformed level is a configuration error, never
//! a silent default.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bodies::Wall;
use crate::consts::*;
use crate::error::ConfigError;

/// Initial state of one piece of debris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisConfig {
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    pub radius: f32,
    /// Rotation speed (radians per frame)
    #[serde(default)]
    pub spin: f32,
}

/// Static description of a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    /// Particle spawn position
    pub start: Vec2,
    /// Particle initial velocity
    #[serde(default)]
    pub drift: Vec2,
    /// Goal center (required; optional here so a missing goal is reportable)
    #[serde(default)]
    pub goal: Option<Vec2>,
    #[serde(default)]
    pub debris: Vec<DebrisConfig>,
    #[serde(default)]
    pub collectibles: Vec<Vec2>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    /// Seed for debris outlines
    #[serde(default)]
    pub seed: u64,
}

fn in_playfield(p: Vec2) -> bool {
    p.x >= 0.0 && p.x <= CANVAS_WIDTH && p.y >= 0.0 && p.y <= CANVAS_HEIGHT
}

impl LevelConfig {
    /// Check a single level; `index` is used for error reporting
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidLevel {
            level: index,
            reason,
        };

        let goal = self.goal.ok_or(ConfigError::MissingGoal { level: index })?;

        if !in_playfield(self.start) {
            return Err(invalid(format!("start {} is outside the playfield", self.start)));
        }
        if !in_playfield(goal) {
            return Err(invalid(format!("goal {} is outside the playfield", goal)));
        }
        for (i, wall) in self.walls.iter().enumerate() {
            if wall.w <= 0.0 || wall.h <= 0.0 {
                return Err(invalid(format!("wall {} has non-positive size", i)));
            }
            if wall.overlaps_circle(self.start, PARTICLE_RADIUS) {
                return Err(invalid(format!("start overlaps wall {}", i)));
            }
        }
        for (i, debris) in self.debris.iter().enumerate() {
            if debris.radius <= 0.0 {
                return Err(invalid(format!("debris {} has non-positive radius", i)));
            }
        }
        for (i, c) in self.collectibles.iter().enumerate() {
            if !in_playfield(*c) {
                return Err(invalid(format!("collectible {} is outside the playfield", i)));
            }
        }
        Ok(())
    }
}

/// Ordered, validated list of levels
#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl LevelTable {
    /// Validate and wrap a list of levels
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (i, level) in levels.iter().enumerate() {
            level.validate(i)?;
        }
        Ok(Self { levels })
    }

    /// Load a level table from a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        let table = Self::new(levels)?;
        log::info!("Loaded {} levels from JSON", table.len());
        Ok(table)
    }

    /// The levels shipped with the game
    pub fn builtin() -> Self {
        Self {
            levels: builtin_levels(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelConfig> {
        self.levels.get(index)
    }

    /// Whether `index` is the final level
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.levels.len()
    }
}

fn wall(x: f32, y: f32, w: f32, h: f32) -> Wall {
    Wall { x, y, w, h }
}

fn debris(x: f32, y: f32, vx: f32, vy: f32, radius: f32, spin: f32) -> DebrisConfig {
    DebrisConfig {
        position: Vec2::new(x, y),
        velocity: Vec2::new(vx, vy),
        radius,
        spin,
    }
}

/// Built-in campaign, easiest first
fn builtin_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig {
            name: "First Pull".into(),
            start: Vec2::new(100.0, 420.0),
            drift: Vec2::new(1.2, 0.0),
            goal: Some(Vec2::new(680.0, 220.0)),
            debris: Vec::new(),
            collectibles: vec![Vec2::new(400.0, 330.0)],
            walls: Vec::new(),
            seed: 1,
        },
        LevelConfig {
            name: "The Gate".into(),
            start: Vec2::new(100.0, 150.0),
            drift: Vec2::new(0.8, 0.0),
            goal: Some(Vec2::new(700.0, 150.0)),
            debris: Vec::new(),
            collectibles: vec![Vec2::new(400.0, 500.0), Vec2::new(600.0, 320.0)],
            walls: vec![wall(380.0, 40.0, 40.0, 360.0)],
            seed: 2,
        },
        LevelConfig {
            name: "Drifters".into(),
            start: Vec2::new(90.0, 110.0),
            drift: Vec2::new(0.6, 0.3),
            goal: Some(Vec2::new(700.0, 500.0)),
            debris: vec![
                debris(420.0, 200.0, 0.0, 0.9, 22.0, 0.02),
                debris(300.0, 460.0, 0.7, 0.0, 18.0, -0.03),
            ],
            collectibles: vec![Vec2::new(250.0, 300.0), Vec2::new(560.0, 360.0)],
            walls: Vec::new(),
            seed: 3,
        },
        LevelConfig {
            name: "Corridor".into(),
            start: Vec2::new(80.0, 320.0),
            drift: Vec2::new(1.0, 0.0),
            goal: Some(Vec2::new(720.0, 320.0)),
            debris: vec![debris(400.0, 320.0, 0.0, 1.1, 16.0, 0.04)],
            collectibles: vec![
                Vec2::new(260.0, 320.0),
                Vec2::new(540.0, 320.0),
                Vec2::new(400.0, 120.0),
            ],
            walls: vec![
                wall(160.0, 200.0, 480.0, 30.0),
                wall(160.0, 410.0, 480.0, 30.0),
            ],
            seed: 4,
        },
        LevelConfig {
            name: "Asteroid Belt".into(),
            start: Vec2::new(80.0, 540.0),
            drift: Vec2::new(0.7, -0.5),
            goal: Some(Vec2::new(720.0, 100.0)),
            debris: vec![
                debris(300.0, 250.0, 0.5, 0.5, 24.0, 0.015),
                debris(500.0, 400.0, -0.6, 0.3, 20.0, -0.02),
                debris(600.0, 200.0, 0.0, -0.8, 14.0, 0.05),
            ],
            collectibles: vec![
                Vec2::new(200.0, 400.0),
                Vec2::new(420.0, 320.0),
                Vec2::new(640.0, 300.0),
            ],
            walls: vec![wall(250.0, 480.0, 160.0, 24.0), wall(560.0, 60.0, 24.0, 120.0)],
            seed: 5,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_validate() {
        let table = LevelTable::builtin();
        assert!(LevelTable::new(builtin_levels()).is_ok());
        assert_eq!(table.len(), 5);
        assert!(table.is_last(4));
        assert!(!table.is_last(0));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(LevelTable::new(Vec::new()), Err(ConfigError::NoLevels)));
        assert!(matches!(LevelTable::from_json("[]"), Err(ConfigError::NoLevels)));
    }

    #[test]
    fn test_missing_goal_rejected() {
        let json = r#"[
            { "name": "ok", "start": [100.0, 100.0], "goal": [700.0, 500.0] },
            { "name": "no goal", "start": [100.0, 100.0] }
        ]"#;
        match LevelTable::from_json(json) {
            Err(ConfigError::MissingGoal { level }) => assert_eq!(level, 1),
            other => panic!("expected MissingGoal, got {:?}", other),
        }
    }

    #[test]
    fn test_json_level_defaults() {
        let json = r#"[{ "name": "bare", "start": [100.0, 100.0], "goal": [700.0, 500.0] }]"#;
        let table = LevelTable::from_json(json).unwrap();
        let level = table.get(0).unwrap();
        assert_eq!(level.drift, Vec2::ZERO);
        assert!(level.debris.is_empty());
        assert!(level.walls.is_empty());
    }

    #[test]
    fn test_start_inside_wall_rejected() {
        let mut level = builtin_levels().remove(0);
        level.walls.push(wall(90.0, 410.0, 20.0, 20.0));
        assert!(matches!(
            level.validate(0),
            Err(ConfigError::InvalidLevel { level: 0, .. })
        ));
    }
}
