//! Sound cues using the Web Audio API
//!
//! Procedurally generated tones, no external files. The cue-to-tone table is
//! plain data so it builds and tests natively; only the player needs a
//! browser.

use crate::sim::Cue;

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One enveloped oscillator note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    /// Exponential glide target, if any
    pub glide_to: Option<f32>,
    pub wave: Wave,
    /// Peak gain before master volume
    pub gain: f32,
    /// Start offset (seconds)
    pub delay: f64,
    /// Decay time (seconds)
    pub duration: f64,
}

const fn tone(freq: f32, wave: Wave, gain: f32, delay: f64, duration: f64) -> Tone {
    Tone {
        freq,
        glide_to: None,
        wave,
        gain,
        delay,
        duration,
    }
}

const fn glide(freq: f32, to: f32, wave: Wave, gain: f32, duration: f64) -> Tone {
    Tone {
        freq,
        glide_to: Some(to),
        wave,
        gain,
        delay: 0.0,
        duration,
    }
}

const ATTRACTOR_PLACED: &[Tone] = &[glide(220.0, 440.0, Wave::Sine, 0.35, 0.15)];
const REPULSOR_PLACED: &[Tone] = &[glide(440.0, 220.0, Wave::Triangle, 0.35, 0.15)];
const WELL_REMOVED: &[Tone] = &[glide(300.0, 120.0, Wave::Sine, 0.25, 0.1)];
const WELL_ADJUSTED: &[Tone] = &[tone(500.0, Wave::Sine, 0.15, 0.0, 0.05)];
const REJECTED: &[Tone] = &[
    tone(140.0, Wave::Square, 0.15, 0.0, 0.08),
    tone(110.0, Wave::Square, 0.15, 0.09, 0.08),
];
const COLLECTED: &[Tone] = &[
    tone(600.0, Wave::Sine, 0.25, 0.0, 0.15),
    tone(800.0, Wave::Sine, 0.25, 0.08, 0.15),
    tone(1000.0, Wave::Sine, 0.25, 0.16, 0.15),
];
const BOUNCE: &[Tone] = &[tone(400.0, Wave::Sine, 0.2, 0.0, 0.08)];
const GOAL: &[Tone] = &[
    tone(400.0, Wave::Triangle, 0.3, 0.0, 0.4),
    tone(500.0, Wave::Triangle, 0.3, 0.1, 0.4),
    tone(600.0, Wave::Triangle, 0.3, 0.2, 0.4),
    tone(800.0, Wave::Triangle, 0.3, 0.3, 0.4),
];
const STRUCK: &[Tone] = &[
    glide(100.0, 30.0, Wave::Sawtooth, 0.5, 0.4),
    tone(1500.0, Wave::Square, 0.2, 0.0, 0.1),
];
const HIGH_SCORE: &[Tone] = &[
    tone(500.0, Wave::Triangle, 0.25, 0.0, 0.25),
    tone(600.0, Wave::Triangle, 0.25, 0.08, 0.25),
    tone(700.0, Wave::Triangle, 0.25, 0.16, 0.25),
    tone(800.0, Wave::Triangle, 0.25, 0.24, 0.25),
    tone(1000.0, Wave::Triangle, 0.25, 0.32, 0.25),
];

/// Notes played for a cue
pub fn cue_tones(cue: Cue) -> &'static [Tone] {
    match cue {
        Cue::WellPlaced { attractor: true } => ATTRACTOR_PLACED,
        Cue::WellPlaced { attractor: false } => REPULSOR_PLACED,
        Cue::WellRemoved => WELL_REMOVED,
        Cue::WellAdjusted => WELL_ADJUSTED,
        Cue::PlacementRejected => REJECTED,
        Cue::Collected => COLLECTED,
        Cue::Bounce => BOUNCE,
        Cue::GoalReached => GOAL,
        Cue::Struck => STRUCK,
        Cue::NewHighScore => HIGH_SCORE,
    }
}

#[cfg(target_arch = "wasm32")]
pub use player::AudioManager;

#[cfg(target_arch = "wasm32")]
mod player {
    use web_sys::{AudioContext, OscillatorType};

    use super::{Tone, Wave, cue_tones};
    use crate::settings::Settings;
    use crate::sim::Cue;

    fn oscillator_type(wave: Wave) -> OscillatorType {
        match wave {
            Wave::Sine => OscillatorType::Sine,
            Wave::Triangle => OscillatorType::Triangle,
            Wave::Square => OscillatorType::Square,
            Wave::Sawtooth => OscillatorType::Sawtooth,
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&self, cue: Cue) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in cue_tones(cue) {
                if self.play_tone(ctx, tone).is_none() {
                    log::debug!("Dropped tone for {:?}", cue);
                }
            }
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone) -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(oscillator_type(tone.wave));
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let t = ctx.current_time() + tone.delay;
            let end = t + tone.duration;

            gain.gain().set_value_at_time(self.volume * tone.gain, t).ok()?;
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;
            osc.frequency().set_value_at_time(tone.freq, t).ok()?;
            if let Some(to) = tone.glide_to {
                osc.frequency().exponential_ramp_to_value_at_time(to, end).ok()?;
            }

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(end + 0.05).ok()?;
            Some(())
        }
    }
}
