//! Sound cues for gameplay events
//!
//! The simulation never plays audio. After each tick the host hands the frame's
//! events to an [`AudioManager`], which maps them to cues and forwards them to
//! whatever [`AudioSink`] the platform provides. Each cue carries a small
//! procedural tone description so a sink can synthesize it without asset files.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Crystal picked up
    Collect,
    /// Shield, magnet or slow-time started
    BoostActivate,
    /// Unshielded obstacle hit
    Hit,
    /// Shield soaked a hit
    ShieldBlock,
    Jump,
    Slide,
    NearMiss,
    /// Combo multiplier went up
    ComboUp,
    GameOver,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// A single frequency sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub wave: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_ms: f32,
    /// Relative loudness before master/sfx volume
    pub gain: f32,
}

impl SoundEffect {
    /// Cue for an event; bookkeeping events stay silent
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CrystalCollected { .. } => Some(SoundEffect::Collect),
            GameEvent::BoostActivated { .. } => Some(SoundEffect::BoostActivate),
            GameEvent::ObstacleHit { .. } => Some(SoundEffect::Hit),
            GameEvent::ShieldBlocked { .. } => Some(SoundEffect::ShieldBlock),
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::Slid => Some(SoundEffect::Slide),
            GameEvent::NearMiss { .. } => Some(SoundEffect::NearMiss),
            GameEvent::ComboUp { .. } => Some(SoundEffect::ComboUp),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::LaneChanged { .. }
            | GameEvent::BoostExpired { .. }
            | GameEvent::PhaseChanged { .. } => None,
        }
    }

    pub fn tone(self) -> Tone {
        let (wave, start_hz, end_hz, duration_ms, gain) = match self {
            // Bright upward chime
            SoundEffect::Collect => (Waveform::Sine, 880.0, 1320.0, 90.0, 0.25),
            SoundEffect::BoostActivate => (Waveform::Triangle, 440.0, 1760.0, 300.0, 0.3),
            // Low thud
            SoundEffect::Hit => (Waveform::Sawtooth, 180.0, 60.0, 250.0, 0.5),
            SoundEffect::ShieldBlock => (Waveform::Square, 600.0, 300.0, 150.0, 0.3),
            SoundEffect::Jump => (Waveform::Sine, 300.0, 600.0, 120.0, 0.2),
            SoundEffect::Slide => (Waveform::Triangle, 400.0, 200.0, 160.0, 0.2),
            SoundEffect::NearMiss => (Waveform::Sine, 1200.0, 900.0, 80.0, 0.15),
            SoundEffect::ComboUp => (Waveform::Square, 660.0, 1320.0, 200.0, 0.25),
            SoundEffect::GameOver => (Waveform::Sawtooth, 440.0, 55.0, 900.0, 0.5),
        };
        Tone {
            wave,
            start_hz,
            end_hz,
            duration_ms,
            gain,
        }
    }
}

/// Platform audio output
pub trait AudioSink {
    /// Fire-and-forget; `volume` is already scaled by the mixer settings
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink for headless runs: writes cues to the log
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("Sound {:?} at {:.2}", effect, volume);
    }
}

/// Audio mixer settings and event routing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Route one frame of events to the sink; returns how many cues played
    pub fn dispatch(&self, events: &[GameEvent], sink: &mut dyn AudioSink) -> usize {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return 0;
        }
        let mut played = 0;
        for event in events {
            let Some(effect) = SoundEffect::for_event(event) else {
                continue;
            };
            sink.play(effect, vol * effect.tone().gain);
            played += 1;
        }
        played
    }
}
