//! Game state machine
//!
//! Owns the session, the active level's bodies and the outbound event queues.
//! Lifecycle changes go through [`transition`]; pause is a separate flag that
//! only exists while playing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bodies::{BodyRegistry, PlacementRejection, Well};
use super::collision::{Contact, detect_contacts, resolve_bodies};
use super::events::{Cue, GameEvent};
use super::field::{advance_well_phases, step_debris, step_particle};
use super::level::LevelTable;
use super::scoring::{ScoreBreakdown, level_score};
use crate::GAME_ID;
use crate::consts::*;
use crate::error::ConfigError;
use crate::persistence::{HighScoreStore, load_high_score, save_high_score};
use crate::tuning::Tuning;

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Menu,
    /// Active gameplay (possibly paused)
    Playing,
    /// Goal reached, waiting for continue
    LevelComplete,
    /// Particle was struck by debris
    GameOver,
}

/// Something that may move the lifecycle forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    GoalReached,
    Struck,
    Continue,
    Restart,
}

/// The lifecycle transition table. `None` means the trigger is rejected.
pub fn transition(phase: GamePhase, trigger: Trigger) -> Option<GamePhase> {
    use GamePhase::*;
    match (phase, trigger) {
        (Menu, Trigger::Start) => Some(Playing),
        (Playing, Trigger::GoalReached) => Some(LevelComplete),
        (Playing, Trigger::Struck) => Some(GameOver),
        (LevelComplete, Trigger::Continue) => Some(Playing),
        (GameOver | Playing | LevelComplete, Trigger::Restart) => Some(Playing),
        _ => None,
    }
}

/// A domain action produced by the input layer, in playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Left click / single tap
    Primary(Vec2),
    /// Right click
    Secondary(Vec2),
    /// Second tap of a double tap
    DoubleTap(Vec2),
    /// Wheel over a well; positive steps strengthen it
    AdjustStrength { at: Vec2, steps: i32 },
    TogglePause,
    /// Pause without toggling (page hidden or focus lost)
    Pause,
    /// Start from the menu or continue after a level
    Confirm,
    Restart,
}

/// Per-play session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub phase: GamePhase,
    pub paused: bool,
    pub level_index: usize,
    /// Cumulative score for this play
    pub score: u64,
    /// Simulated ticks since the level was loaded (frozen while paused)
    pub level_ticks: u64,
    /// Placements this level; removals don't give them back
    pub wells_used: u32,
    /// Set once a terminal contact has been acted on this level
    pub resolved: bool,
    pub high_score: u64,
    pub new_high_score: bool,
    /// Breakdown of the most recently completed level
    pub last_level: Option<ScoreBreakdown>,
    /// Well placed by the latest primary action, for double-tap conversion
    pub last_placed: Option<u32>,
    /// Well removed by the latest primary action; a double tap on it brings
    /// it back as a repulsor
    pub last_removed: Option<Well>,
}

impl GameSession {
    pub fn new(high_score: u64) -> Self {
        Self {
            phase: GamePhase::Menu,
            paused: false,
            level_index: 0,
            score: 0,
            level_ticks: 0,
            wells_used: 0,
            resolved: false,
            high_score,
            new_high_score: false,
            last_level: None,
            last_placed: None,
            last_removed: None,
        }
    }
}

/// The game: session, bodies, configuration and outbound queues
pub struct GameMachine {
    session: GameSession,
    bodies: BodyRegistry,
    levels: LevelTable,
    tuning: Tuning,
    store: Box<dyn HighScoreStore>,
    events: Vec<GameEvent>,
    cues: Vec<Cue>,
}

impl GameMachine {
    /// Create a machine in the menu with level 0 loaded behind it
    pub fn new(
        levels: LevelTable,
        tuning: Tuning,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let first = levels.get(0).ok_or(ConfigError::NoLevels)?;
        let bodies = BodyRegistry::from_level(first, 0)?;
        let high_score = load_high_score(store.as_ref(), GAME_ID);
        log::info!(
            "Game ready: {} levels, high score {}",
            levels.len(),
            high_score
        );

        Ok(Self {
            session: GameSession::new(high_score),
            bodies,
            levels,
            tuning,
            store,
            events: Vec::new(),
            cues: Vec::new(),
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &dyn HighScoreStore {
        self.store.as_ref()
    }

    /// Name of the active level
    pub fn level_name(&self) -> &str {
        self.levels
            .get(self.session.level_index)
            .map(|l| l.name.as_str())
            .unwrap_or("")
    }

    /// Wells the player may still place this level
    pub fn wells_left(&self) -> usize {
        self.tuning.max_wells.saturating_sub(self.bodies.wells.len())
    }

    /// Take all pending lifecycle events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take all pending feedback cues
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    /// Apply one input action
    pub fn apply(&mut self, action: InputAction) {
        let phase = self.session.phase;
        match action {
            InputAction::TogglePause => {
                if phase == GamePhase::Playing {
                    self.session.paused = !self.session.paused;
                    log::info!("Paused: {}", self.session.paused);
                }
            }
            InputAction::Pause => {
                if phase == GamePhase::Playing && !self.session.paused {
                    self.session.paused = true;
                    log::info!("Auto-paused");
                }
            }
            InputAction::Restart => {
                self.fire(Trigger::Restart);
            }
            InputAction::Confirm => self.confirm(),
            InputAction::Primary(p) => match phase {
                GamePhase::Menu | GamePhase::LevelComplete => self.confirm(),
                _ if self.can_edit() => self.primary(p),
                _ => {}
            },
            InputAction::Secondary(p) if self.can_edit() => self.secondary(p),
            InputAction::DoubleTap(p) if self.can_edit() => self.double_tap(p),
            InputAction::AdjustStrength { at, steps } if self.can_edit() => {
                let adjusted = self
                    .bodies
                    .well_at(at)
                    .and_then(|i| self.bodies.adjust_well(i, steps, &self.tuning));
                if let Some(strength) = adjusted {
                    log::debug!("Well strength now {}", strength);
                    self.cues.push(Cue::WellAdjusted);
                }
            }
            _ => {}
        }
    }

    /// Request a lifecycle transition; returns whether it was accepted
    pub fn fire(&mut self, trigger: Trigger) -> bool {
        let from = self.session.phase;
        let Some(to) = transition(from, trigger) else {
            log::debug!("Rejected {:?} in {:?}", trigger, from);
            return false;
        };

        match trigger {
            Trigger::Start => {
                if !self.start_game() {
                    return false;
                }
            }
            Trigger::Restart => {
                // The final level and a strike already reported the end
                let ended = match from {
                    GamePhase::GameOver => true,
                    GamePhase::LevelComplete => self.levels.is_last(self.session.level_index),
                    _ => false,
                };
                if !ended {
                    self.emit_game_end(false);
                }
                if !self.start_game() {
                    return false;
                }
            }
            Trigger::Continue => {
                let index = self.session.level_index;
                if self.levels.is_last(index) {
                    log::info!("Campaign complete, looping back to the first level");
                    if !self.start_game() {
                        return false;
                    }
                } else if !self.load_level(index + 1) {
                    return false;
                }
            }
            Trigger::GoalReached => self.complete_level(),
            Trigger::Struck => {
                self.cues.push(Cue::Struck);
                log::info!(
                    "Game over on level {} with {} points",
                    self.session.level_index,
                    self.session.score
                );
                self.check_high_score();
                self.emit_game_end(false);
            }
        }

        self.session.phase = to;
        self.session.paused = false;
        true
    }

    /// Advance the simulation by one fixed step
    pub fn tick(&mut self, dt: f32) {
        if self.session.phase != GamePhase::Playing || self.session.paused {
            return;
        }

        let tuning = &self.tuning;
        let bodies = &mut self.bodies;
        step_particle(&mut bodies.particle, &bodies.wells, dt, tuning);
        for debris in &mut bodies.debris {
            step_debris(debris, &bodies.wells, dt, tuning);
        }
        if resolve_bodies(bodies, tuning) > 0 {
            self.cues.push(Cue::Bounce);
        }
        bodies.particle.record_trail();
        advance_well_phases(&mut bodies.wells, WELL_PULSE_RATE, dt);
        self.session.level_ticks += 1;

        if self.session.resolved {
            return;
        }

        let contacts = detect_contacts(&mut self.bodies);
        let mut struck = false;
        let mut goal = false;
        for contact in contacts {
            match contact {
                Contact::Collected(i) => {
                    log::debug!("Collected pickup {}", i);
                    self.cues.push(Cue::Collected);
                }
                Contact::Struck(_) => struck = true,
                Contact::GoalReached => goal = true,
            }
        }

        // A strike wins over reaching the goal on the same tick
        if struck {
            self.session.resolved = true;
            self.fire(Trigger::Struck);
        } else if goal {
            self.session.resolved = true;
            self.fire(Trigger::GoalReached);
        }
    }

    fn can_edit(&self) -> bool {
        self.session.phase == GamePhase::Playing && !self.session.paused
    }

    fn confirm(&mut self) {
        match self.session.phase {
            GamePhase::Menu => {
                self.fire(Trigger::Start);
            }
            GamePhase::LevelComplete => {
                self.fire(Trigger::Continue);
            }
            _ => {}
        }
    }

    fn primary(&mut self, p: Vec2) {
        if let Some(i) = self.bodies.well_at(p) {
            self.session.last_removed = Some(self.remove_well(i));
            self.session.last_placed = None;
            return;
        }
        self.session.last_removed = None;
        self.session.last_placed = self.place_well(p, self.tuning.default_strength);
    }

    fn secondary(&mut self, p: Vec2) {
        self.session.last_placed = None;
        self.session.last_removed = None;
        if let Some(i) = self.bodies.well_at(p) {
            self.remove_well(i);
            return;
        }
        self.place_well(p, -self.tuning.default_strength);
    }

    fn double_tap(&mut self, p: Vec2) {
        let converted = self
            .session
            .last_placed
            .take()
            .and_then(|id| self.bodies.well_index_by_id(id))
            .filter(|&i| self.bodies.wells[i].pos.distance(p) <= DOUBLE_TAP_RADIUS);

        if let Some(i) = converted {
            self.bodies.make_repulsor(i);
            self.cues.push(Cue::WellPlaced { attractor: false });
            return;
        }

        // First tap landed on an existing well and removed it: flip it
        // instead, without charging a placement
        let removed = self
            .session
            .last_removed
            .take()
            .filter(|w| w.pos.distance(p) <= DOUBLE_TAP_RADIUS);
        if let Some(well) = removed {
            match self.bodies.place_well(well.pos, -well.strength.abs(), &self.tuning) {
                Ok(_) => self.cues.push(Cue::WellPlaced { attractor: false }),
                Err(reason) => log::debug!("Could not restore well {}: {:?}", well.id, reason),
            }
            return;
        }

        self.place_well(p, -self.tuning.default_strength);
    }

    fn place_well(&mut self, p: Vec2, strength: f32) -> Option<u32> {
        match self.bodies.place_well(p, strength, &self.tuning) {
            Ok(id) => {
                self.session.wells_used += 1;
                self.cues.push(Cue::WellPlaced {
                    attractor: strength >= 0.0,
                });
                Some(id)
            }
            Err(reason) => {
                log::debug!("Well placement at {} rejected: {:?}", p, reason);
                self.cues.push(Cue::PlacementRejected);
                if reason == PlacementRejection::TooManyWells {
                    log::debug!("All {} wells in use", self.tuning.max_wells);
                }
                None
            }
        }
    }

    fn remove_well(&mut self, index: usize) -> Well {
        let well = self.bodies.remove_well(index);
        log::debug!("Removed well {}", well.id);
        self.cues.push(Cue::WellRemoved);
        well
    }

    /// Reset the session and load level 0
    fn start_game(&mut self) -> bool {
        if !self.load_level(0) {
            return false;
        }
        self.session.score = 0;
        self.session.new_high_score = false;
        self.session.last_level = None;
        self.events.push(GameEvent::GameStart {
            game_id: GAME_ID.to_string(),
        });
        true
    }

    /// Rebuild bodies for `index` and clear per-level session state
    fn load_level(&mut self, index: usize) -> bool {
        let built = self
            .levels
            .get(index)
            .ok_or(ConfigError::InvalidLevel {
                level: index,
                reason: "no such level".into(),
            })
            .and_then(|level| BodyRegistry::from_level(level, index));

        match built {
            Ok(bodies) => {
                self.bodies = bodies;
                self.session.level_index = index;
                self.session.level_ticks = 0;
                self.session.wells_used = 0;
                self.session.resolved = false;
                self.session.last_placed = None;
                self.session.last_removed = None;
                log::info!("Loaded level {}: {}", index + 1, self.level_name());
                true
            }
            Err(e) => {
                log::error!("Could not load level {}: {}", index, e);
                false
            }
        }
    }

    fn complete_level(&mut self) {
        let breakdown = level_score(
            self.bodies.collected_count(),
            self.session.level_ticks,
            self.session.wells_used,
        );
        self.session.score += breakdown.total;
        self.session.last_level = Some(breakdown);
        self.cues.push(Cue::GoalReached);
        log::info!(
            "Level {} complete: +{} (total {})",
            self.session.level_index + 1,
            breakdown.total,
            self.session.score
        );

        self.events.push(GameEvent::LevelComplete {
            game_id: GAME_ID.to_string(),
            level: self.session.level_index,
            score: self.session.score,
        });
        self.check_high_score();

        if self.levels.is_last(self.session.level_index) {
            self.emit_game_end(true);
        }
    }

    /// Raise the high score if beaten. The flag stays set for the rest of
    /// the play; only a new game clears it.
    fn check_high_score(&mut self) {
        if self.session.score <= self.session.high_score {
            return;
        }
        self.session.high_score = self.session.score;
        self.session.new_high_score = true;
        self.cues.push(Cue::NewHighScore);
        log::info!("New high score: {}", self.session.score);
        save_high_score(self.store.as_mut(), GAME_ID, self.session.score);
    }

    fn emit_game_end(&mut self, completed: bool) {
        self.events.push(GameEvent::GameEnd {
            game_id: GAME_ID.to_string(),
            score: self.session.score,
            completed,
            level: self.session.level_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{FailingStore, MemoryStore};
    use crate::sim::level::{DebrisConfig, LevelConfig};

    fn level(start: Vec2, drift: Vec2, goal: Vec2) -> LevelConfig {
        LevelConfig {
            name: "test".into(),
            start,
            drift,
            goal: Some(goal),
            debris: Vec::new(),
            collectibles: Vec::new(),
            walls: Vec::new(),
            seed: 9,
        }
    }

    /// Particle drifts straight into the goal within a few ticks
    fn quick_goal() -> LevelConfig {
        level(Vec2::new(100.0, 300.0), Vec2::new(2.0, 0.0), Vec2::new(140.0, 300.0))
    }

    /// Particle starts on top of debris
    fn instant_strike() -> LevelConfig {
        let mut l = level(Vec2::new(100.0, 300.0), Vec2::ZERO, Vec2::new(700.0, 300.0));
        l.debris.push(DebrisConfig {
            position: Vec2::new(100.0, 300.0),
            velocity: Vec2::ZERO,
            radius: 10.0,
            spin: 0.0,
        });
        l
    }

    /// Particle sits still far from everything
    fn idle() -> LevelConfig {
        level(Vec2::new(100.0, 300.0), Vec2::ZERO, Vec2::new(700.0, 300.0))
    }

    fn machine(levels: Vec<LevelConfig>) -> GameMachine {
        GameMachine::new(
            LevelTable::new(levels).unwrap(),
            Tuning::default(),
            Box::new(MemoryStore::new()),
        )
        .unwrap()
    }

    fn run(m: &mut GameMachine, ticks: usize) {
        for _ in 0..ticks {
            m.tick(SIM_DT);
        }
    }

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        assert_eq!(transition(Menu, Trigger::Start), Some(Playing));
        assert_eq!(transition(Playing, Trigger::GoalReached), Some(LevelComplete));
        assert_eq!(transition(Playing, Trigger::Struck), Some(GameOver));
        assert_eq!(transition(LevelComplete, Trigger::Continue), Some(Playing));
        assert_eq!(transition(GameOver, Trigger::Restart), Some(Playing));
        assert_eq!(transition(Playing, Trigger::Restart), Some(Playing));
        assert_eq!(transition(LevelComplete, Trigger::Restart), Some(Playing));

        assert_eq!(transition(Menu, Trigger::Restart), None);
        assert_eq!(transition(GameOver, Trigger::Continue), None);
        assert_eq!(transition(GameOver, Trigger::Start), None);
        assert_eq!(transition(LevelComplete, Trigger::Struck), None);
        assert_eq!(transition(Playing, Trigger::Start), None);
    }

    #[test]
    fn test_primary_in_menu_starts() {
        let mut m = machine(vec![idle()]);
        assert_eq!(m.phase(), GamePhase::Menu);
        m.apply(InputAction::Primary(Vec2::new(400.0, 300.0)));
        assert_eq!(m.phase(), GamePhase::Playing);
        // The click only started the game
        assert!(m.bodies().wells.is_empty());
        assert_eq!(
            m.drain_events(),
            vec![GameEvent::GameStart {
                game_id: GAME_ID.into()
            }]
        );
    }

    #[test]
    fn test_no_simulation_outside_playing() {
        let mut m = machine(vec![quick_goal()]);
        let start = m.bodies().particle.pos;
        run(&mut m, 10);
        assert_eq!(m.bodies().particle.pos, start);
        assert_eq!(m.session().level_ticks, 0);
    }

    #[test]
    fn test_debris_overlap_ends_game_exactly_once() {
        let mut m = machine(vec![instant_strike()]);
        m.apply(InputAction::Confirm);
        m.drain_events();

        run(&mut m, 5);
        assert_eq!(m.phase(), GamePhase::GameOver);

        let ends = m
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameEnd { .. }))
            .count();
        assert_eq!(ends, 1);
        let strikes = m.drain_cues().into_iter().filter(|c| *c == Cue::Struck).count();
        assert_eq!(strikes, 1);
    }

    #[test]
    fn test_game_over_leaves_only_via_restart() {
        let mut m = machine(vec![instant_strike()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 1);
        assert_eq!(m.phase(), GamePhase::GameOver);

        let p = Vec2::new(400.0, 300.0);
        for action in [
            InputAction::Primary(p),
            InputAction::Secondary(p),
            InputAction::DoubleTap(p),
            InputAction::AdjustStrength { at: p, steps: 1 },
            InputAction::TogglePause,
            InputAction::Confirm,
        ] {
            m.apply(action);
            assert_eq!(m.phase(), GamePhase::GameOver);
        }
        assert!(!m.fire(Trigger::Continue));
        assert!(!m.session().paused);
        assert!(m.bodies().wells.is_empty());

        m.apply(InputAction::Restart);
        assert_eq!(m.phase(), GamePhase::Playing);
        assert_eq!(m.session().level_index, 0);
        assert_eq!(m.session().score, 0);
        assert!(!m.session().resolved);
    }

    #[test]
    fn test_goal_scores_and_continues() {
        let mut m = machine(vec![quick_goal(), idle()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);
        assert_eq!(m.phase(), GamePhase::LevelComplete);

        let breakdown = m.session().last_level.unwrap();
        assert_eq!(breakdown, level_score(0, m.session().level_ticks, 0));
        assert_eq!(m.session().score, breakdown.total);
        assert!(m.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::LevelComplete { level: 0, .. }
        )));

        // Ticks don't advance while waiting
        let ticks = m.session().level_ticks;
        run(&mut m, 5);
        assert_eq!(m.session().level_ticks, ticks);

        m.apply(InputAction::Primary(Vec2::new(400.0, 300.0)));
        assert_eq!(m.phase(), GamePhase::Playing);
        assert_eq!(m.session().level_index, 1);
        assert_eq!(m.session().level_ticks, 0);
        assert_eq!(m.session().score, breakdown.total);
    }

    #[test]
    fn test_last_level_loops_back_with_fresh_score() {
        let mut m = machine(vec![quick_goal()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);
        assert_eq!(m.phase(), GamePhase::LevelComplete);
        let events = m.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::GameEnd { completed: true, .. }
        )));

        m.apply(InputAction::Confirm);
        assert_eq!(m.phase(), GamePhase::Playing);
        assert_eq!(m.session().level_index, 0);
        assert_eq!(m.session().score, 0);
        assert!(m.drain_events().iter().any(|e| matches!(e, GameEvent::GameStart { .. })));
    }

    #[test]
    fn test_high_score_persisted() {
        let mut m = machine(vec![quick_goal()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);

        let score = m.session().score;
        assert!(score > 0);
        assert!(m.session().new_high_score);
        assert_eq!(m.session().high_score, score);
        assert_eq!(m.store().get_high_score(GAME_ID).unwrap(), score);
        assert!(m.drain_cues().contains(&Cue::NewHighScore));
    }

    #[test]
    fn test_new_high_flag_survives_game_over() {
        let mut m = machine(vec![quick_goal(), instant_strike()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);
        assert_eq!(m.phase(), GamePhase::LevelComplete);
        assert!(m.session().new_high_score);
        let score = m.session().score;

        m.apply(InputAction::Confirm);
        run(&mut m, 1);
        assert_eq!(m.phase(), GamePhase::GameOver);
        assert!(m.session().new_high_score, "record set this play");
        assert_eq!(m.session().high_score, score);

        // A new play starts without the flag
        m.apply(InputAction::Restart);
        assert!(!m.session().new_high_score);
    }

    #[test]
    fn test_failing_store_does_not_break_play() {
        let mut m = GameMachine::new(
            LevelTable::new(vec![quick_goal()]).unwrap(),
            Tuning::default(),
            Box::new(FailingStore),
        )
        .unwrap();
        assert_eq!(m.session().high_score, 0);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);
        assert_eq!(m.phase(), GamePhase::LevelComplete);
        assert!(m.session().new_high_score);
    }

    #[test]
    fn test_pause_freezes_simulation_and_edits() {
        let mut m = machine(vec![quick_goal()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 2);
        m.apply(InputAction::TogglePause);
        assert!(m.session().paused);

        let pos = m.bodies().particle.pos;
        let ticks = m.session().level_ticks;
        run(&mut m, 20);
        assert_eq!(m.bodies().particle.pos, pos);
        assert_eq!(m.session().level_ticks, ticks);

        m.apply(InputAction::Primary(Vec2::new(400.0, 400.0)));
        assert!(m.bodies().wells.is_empty());

        m.apply(InputAction::TogglePause);
        run(&mut m, 1);
        assert_ne!(m.bodies().particle.pos, pos);
    }

    #[test]
    fn test_auto_pause_never_unpauses() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::Pause);
        assert!(!m.session().paused);

        m.apply(InputAction::Confirm);
        m.apply(InputAction::Pause);
        m.apply(InputAction::Pause);
        assert!(m.session().paused);
    }

    #[test]
    fn test_pause_only_toggles_while_playing() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::TogglePause);
        assert!(!m.session().paused);
    }

    #[test]
    fn test_place_and_remove_wells() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::Confirm);
        let p = Vec2::new(400.0, 400.0);

        m.apply(InputAction::Primary(p));
        assert_eq!(m.bodies().wells.len(), 1);
        assert!(m.bodies().wells[0].is_attractor());
        assert_eq!(m.wells_left(), MAX_WELLS - 1);

        m.apply(InputAction::Primary(p + Vec2::new(5.0, 0.0)));
        assert!(m.bodies().wells.is_empty());
        // Removal doesn't refund the efficiency count
        assert_eq!(m.session().wells_used, 1);

        m.apply(InputAction::Secondary(p));
        assert!(!m.bodies().wells[0].is_attractor());
        m.apply(InputAction::Secondary(p));
        assert!(m.bodies().wells.is_empty());
        assert_eq!(m.session().wells_used, 2);

        m.apply(InputAction::Primary(Vec2::new(400.0, 10.0)));
        assert!(m.bodies().wells.is_empty());
        assert!(m.drain_cues().contains(&Cue::PlacementRejected));
    }

    #[test]
    fn test_double_tap_converts_placed_well() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::Confirm);
        let p = Vec2::new(400.0, 400.0);

        m.apply(InputAction::Primary(p));
        m.apply(InputAction::DoubleTap(p + Vec2::new(3.0, 0.0)));
        assert_eq!(m.bodies().wells.len(), 1);
        assert!(!m.bodies().wells[0].is_attractor());
        assert_eq!(m.session().wells_used, 1);

        // On empty space it places a repulsor
        m.apply(InputAction::DoubleTap(Vec2::new(600.0, 200.0)));
        assert_eq!(m.bodies().wells.len(), 2);
        assert!(!m.bodies().wells[1].is_attractor());
    }

    #[test]
    fn test_wheel_adjusts_hovered_well() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::Confirm);
        let p = Vec2::new(400.0, 400.0);
        m.apply(InputAction::Primary(p));

        m.apply(InputAction::AdjustStrength { at: p, steps: 3 });
        assert_eq!(m.bodies().wells[0].strength, DEFAULT_STRENGTH + 3.0 * STRENGTH_STEP);

        m.apply(InputAction::AdjustStrength { at: p, steps: -100 });
        assert_eq!(m.bodies().wells[0].strength, MIN_STRENGTH);

        // Nothing under the cursor
        m.apply(InputAction::AdjustStrength {
            at: Vec2::new(700.0, 500.0),
            steps: 5,
        });
        assert_eq!(m.bodies().wells[0].strength, MIN_STRENGTH);
    }

    #[test]
    fn test_double_tap_on_existing_well_flips_it() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::Confirm);
        let p = Vec2::new(400.0, 400.0);
        m.apply(InputAction::Primary(p));
        m.drain_cues();

        // First tap of the pair removes, the second brings it back repelling
        m.apply(InputAction::Primary(p));
        assert!(m.bodies().wells.is_empty());
        m.apply(InputAction::DoubleTap(p + Vec2::new(0.0, 4.0)));

        assert_eq!(m.bodies().wells.len(), 1);
        let well = &m.bodies().wells[0];
        assert_eq!(well.pos, p);
        assert_eq!(well.strength, -DEFAULT_STRENGTH);
        assert_eq!(m.session().wells_used, 1);
        assert!(m.drain_cues().contains(&Cue::WellPlaced { attractor: false }));
    }

    #[test]
    fn test_collectible_counted_once() {
        let mut l = quick_goal();
        l.goal = Some(Vec2::new(700.0, 300.0));
        l.collectibles.push(Vec2::new(110.0, 300.0));
        let mut m = machine(vec![l]);
        m.apply(InputAction::Confirm);

        run(&mut m, 20);
        assert_eq!(m.bodies().collected_count(), 1);
        let collected = m.drain_cues().into_iter().filter(|c| *c == Cue::Collected).count();
        assert_eq!(collected, 1);
    }

    #[test]
    fn test_restart_mid_game_reports_abandoned_game() {
        let mut m = machine(vec![idle()]);
        m.apply(InputAction::Confirm);
        m.drain_events();
        m.apply(InputAction::Restart);
        let events = m.drain_events();
        assert!(matches!(
            events[0],
            GameEvent::GameEnd { completed: false, .. }
        ));
        assert!(matches!(events[1], GameEvent::GameStart { .. }));
        assert_eq!(m.phase(), GamePhase::Playing);
    }

    fn game_ends(events: &[GameEvent]) -> Vec<bool> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::GameEnd { completed, .. } => Some(*completed),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_restart_after_final_level_reports_one_end() {
        let mut m = machine(vec![quick_goal()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);
        assert_eq!(m.phase(), GamePhase::LevelComplete);

        m.apply(InputAction::Restart);
        assert_eq!(m.phase(), GamePhase::Playing);
        assert_eq!(game_ends(&m.drain_events()), vec![true]);
    }

    #[test]
    fn test_restart_between_levels_reports_abandoned_game() {
        let mut m = machine(vec![quick_goal(), idle()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 30);
        assert_eq!(m.phase(), GamePhase::LevelComplete);

        m.apply(InputAction::Restart);
        assert_eq!(game_ends(&m.drain_events()), vec![false]);
    }

    #[test]
    fn test_restart_after_game_over_reports_one_end() {
        let mut m = machine(vec![instant_strike()]);
        m.apply(InputAction::Confirm);
        run(&mut m, 1);
        assert_eq!(m.phase(), GamePhase::GameOver);

        m.apply(InputAction::Restart);
        assert_eq!(game_ends(&m.drain_events()), vec![false]);
    }
}
