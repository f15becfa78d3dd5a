//! Speed ramp and obstacle cadence
//!
//! Speed climbs in steps every `speed_interval_ms` and is capped. The obstacle
//! spawn interval shrinks linearly with speed. The grace period is a separate
//! gate checked by the spawner.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyCurve {
    pub base_speed: f32,
    pub max_speed: f32,
    /// Head Start upgrade bonus
    pub start_bonus: f32,
    pub increment: f32,
    pub interval_ms: f32,
    pub slow_factor: f32,
    pub min_spawn_interval_ms: f32,
    pub max_spawn_interval_ms: f32,
    pub grace_period_ms: f32,
}

impl DifficultyCurve {
    pub fn new(tuning: &Tuning, start_speed_level: u32) -> Self {
        Self {
            base_speed: tuning.base_speed,
            max_speed: tuning.max_speed,
            start_bonus: start_speed_level as f32 * tuning.start_speed_per_level,
            increment: tuning.speed_increment,
            interval_ms: tuning.speed_interval_ms,
            slow_factor: tuning.slow_factor,
            min_spawn_interval_ms: tuning.obstacle_interval_min_ms,
            max_spawn_interval_ms: tuning.obstacle_interval_max_ms,
            grace_period_ms: tuning.grace_period_ms,
        }
    }

    /// Unmodified speed after `elapsed_ms` of running
    pub fn speed(&self, elapsed_ms: f32) -> f32 {
        let steps = (elapsed_ms / self.interval_ms).floor();
        (self.base_speed + self.start_bonus + steps * self.increment).min(self.max_speed)
    }

    /// Speed after the slow-time modifier
    pub fn effective_speed(&self, elapsed_ms: f32, slow_active: bool) -> f32 {
        let speed = self.speed(elapsed_ms);
        if slow_active {
            speed * self.slow_factor
        } else {
            speed
        }
    }

    /// Progress from base to max speed in [0, 1]
    pub fn ratio(&self, speed: f32) -> f32 {
        let span = self.max_speed - self.base_speed;
        if span <= 0.0 {
            return 1.0;
        }
        ((speed - self.base_speed) / span).clamp(0.0, 1.0)
    }

    /// Difficulty level for HUD/tuning displays
    pub fn difficulty_ratio(&self, elapsed_ms: f32) -> f32 {
        self.ratio(self.speed(elapsed_ms))
    }

    /// Milliseconds between obstacle spawns at a given (unmodified) speed
    pub fn spawn_interval(&self, speed: f32) -> f32 {
        let ratio = self.ratio(speed);
        let interval = self.max_spawn_interval_ms
            - ratio * (self.max_spawn_interval_ms - self.min_spawn_interval_ms);
        interval.max(self.min_spawn_interval_ms)
    }

    /// Whether the opening no-obstacle window is still running
    pub fn in_grace_period(&self, elapsed_ms: f32) -> bool {
        elapsed_ms <= self.grace_period_ms
    }
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self::new(&Tuning::default(), 0)
    }
}
