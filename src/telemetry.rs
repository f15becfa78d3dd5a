//! Gameplay telemetry and run validation
//!
//! The simulation appends one entry per action that actually took effect.
//! The log travels with the run summary to whoever signs rewards, which
//! replays the checks in [`validate_run`] before accepting the result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryKind {
    Jump,
    Slide,
    Collect,
    Hit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEntry {
    /// Run time (unpaused) when the action happened
    pub at_ms: f32,
    pub kind: TelemetryKind,
}

/// Append-only, time-ordered event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryLog {
    pub entries: Vec<TelemetryEntry>,
}

impl TelemetryLog {
    pub fn record(&mut self, at_ms: f32, kind: TelemetryKind) {
        self.entries.push(TelemetryEntry { at_ms, kind });
    }

    pub fn count(&self, kind: TelemetryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a validator needs from a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogs {
    pub score: u64,
    pub crystals: u32,
    pub duration_ms: f32,
    pub telemetry: Vec<TelemetryEntry>,
}

impl From<&GameState> for RunLogs {
    fn from(state: &GameState) -> Self {
        Self {
            score: state.board.score,
            crystals: state.board.crystals,
            duration_ms: state.elapsed_ms,
            telemetry: state.telemetry.entries.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationLimits {
    pub max_score_per_second: f64,
    pub max_duration_ms: f32,
    /// Allowed gap between collect events and reported crystals
    pub crystal_margin: u32,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_score_per_second: 100.0,
            max_duration_ms: 10.0 * 60.0 * 1000.0,
            crystal_margin: 2,
        }
    }
}

/// Reasons a run is rejected
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid basic stats (duration {duration_ms}ms)")]
    InvalidStats { duration_ms: f32 },

    #[error("run too long: {duration_ms}ms")]
    TooLong { duration_ms: f32 },

    #[error("score too high for duration: {rate:.1}/s")]
    ScoreRate { rate: f64 },

    #[error("crystal count mismatch: {collects} collect events for {crystals} crystals")]
    CrystalMismatch { collects: usize, crystals: u32 },

    #[error("telemetry out of order at entry {index}")]
    OutOfOrder { index: usize },
}

/// Check a finished run against the limits, first failure wins
pub fn validate_run(logs: &RunLogs, limits: &ValidationLimits) -> Result<(), ValidationError> {
    let duration_ms = logs.duration_ms;
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return Err(ValidationError::InvalidStats { duration_ms });
    }
    if duration_ms > limits.max_duration_ms {
        return Err(ValidationError::TooLong { duration_ms });
    }

    let rate = logs.score as f64 / duration_ms as f64 * 1000.0;
    if rate > limits.max_score_per_second {
        return Err(ValidationError::ScoreRate { rate });
    }

    let collects = logs
        .telemetry
        .iter()
        .filter(|e| e.kind == TelemetryKind::Collect)
        .count();
    if collects.abs_diff(logs.crystals as usize) > limits.crystal_margin as usize {
        return Err(ValidationError::CrystalMismatch {
            collects,
            crystals: logs.crystals,
        });
    }

    // Entries are appended in run time; anything else was edited
    let mut last = 0.0;
    for (index, entry) in logs.telemetry.iter().enumerate() {
        if entry.at_ms < last || entry.at_ms > duration_ms {
            return Err(ValidationError::OutOfOrder { index });
        }
        last = entry.at_ms;
    }

    Ok(())
}
