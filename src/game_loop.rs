//! Fixed-timestep game loop
//!
//! Host callbacks push raw events; the loop turns wall-clock frames into a
//! whole number of simulation steps. Queued input is drained at the start of
//! the next step, so every action lands on a tick boundary.

use std::collections::VecDeque;

use crate::consts::*;
use crate::platform::{InputController, InputEvent};
use crate::render::{RenderSnapshot, RenderSurface, SnapshotOptions, build_snapshot, render};
use crate::sim::{Cue, GameEvent, GameMachine};

/// Scheduler driving a [`GameMachine`]
pub struct GameLoop {
    machine: GameMachine,
    input: InputController,
    queue: VecDeque<InputEvent>,
    accumulator: f32,
    last_time_ms: Option<f64>,
    alive: bool,
    pub options: SnapshotOptions,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl GameLoop {
    pub fn new(machine: GameMachine, input: InputController) -> Self {
        Self {
            machine,
            input,
            queue: VecDeque::new(),
            accumulator: 0.0,
            last_time_ms: None,
            alive: true,
            options: SnapshotOptions::default(),
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    pub fn machine(&self) -> &GameMachine {
        &self.machine
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn pending_input(&self) -> usize {
        self.queue.len()
    }

    /// Queue a host event for the next step
    pub fn push_event(&mut self, event: InputEvent) {
        if self.alive {
            self.queue.push_back(event);
        }
    }

    /// Run one display frame at `now_ms`; returns the number of steps taken
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        if !self.alive {
            return 0;
        }
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.track_fps(now_ms);
        self.advance(dt)
    }

    /// Advance by a wall-clock delta in seconds
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.alive {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME_DELTA);

        let mut substeps = 0;
        while self.accumulator >= STEP_SECONDS && substeps < MAX_SUBSTEPS {
            self.drain_input();
            self.machine.tick(SIM_DT);
            self.accumulator -= STEP_SECONDS;
            substeps += 1;
        }
        substeps
    }

    fn drain_input(&mut self) {
        while let Some(event) = self.queue.pop_front() {
            if let Some(action) = self.input.handle(event) {
                self.machine.apply(action);
            }
        }
    }

    fn track_fps(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % 60;

        // Oldest sample is the next slot to be overwritten
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                self.fps = (59_000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        build_snapshot(&self.machine, self.options)
    }

    /// Build this frame's snapshot and hand it to the surface
    pub fn render_to(&self, surface: Option<&mut dyn RenderSurface>) {
        if self.alive {
            render(surface, &self.snapshot());
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.machine.drain_events()
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        self.machine.drain_cues()
    }

    /// Stop the loop: queued input is discarded and later frames are no-ops
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.queue.clear();
        self.accumulator = 0.0;
        log::info!("Game loop torn down");
    }
}
