//! Spawn cadence for obstacles, boosts and crystal rows
//!
//! Two independent count-up timers. The obstacle threshold is re-read from the
//! difficulty curve after every spawn; the crystal threshold is fixed.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyCurve;
use super::entities::{BoostKind, EntityRegistry, ObstacleKind};
use crate::consts::LANE_COUNT;
use crate::tuning::Tuning;

/// What a single spawner update created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub obstacles: u32,
    pub boosts: u32,
    pub crystals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub obstacle_timer_ms: f32,
    pub crystal_timer_ms: f32,
    /// Threshold for the next obstacle, refreshed on every obstacle spawn
    pub obstacle_interval_ms: f32,
}

impl Spawner {
    pub fn new(curve: &DifficultyCurve) -> Self {
        Self {
            obstacle_timer_ms: 0.0,
            crystal_timer_ms: 0.0,
            obstacle_interval_ms: curve.spawn_interval(curve.speed(0.0)),
        }
    }

    /// Advance spawn timers and create whatever is due.
    ///
    /// `elapsed_ms` is the run time after this frame's advance; obstacles
    /// (and the boosts that ride along with them) stay suppressed during the
    /// grace period.
    pub fn update(
        &mut self,
        dt_ms: f32,
        elapsed_ms: f32,
        curve: &DifficultyCurve,
        tuning: &Tuning,
        registry: &mut EntityRegistry,
        rng: &mut Pcg32,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();

        if !curve.in_grace_period(elapsed_ms) {
            self.obstacle_timer_ms += dt_ms;
            if self.obstacle_timer_ms >= self.obstacle_interval_ms {
                self.obstacle_timer_ms = 0.0;
                self.obstacle_interval_ms = curve.spawn_interval(curve.speed(elapsed_ms));

                spawn_obstacle(registry, rng, tuning.spawn_depth);
                report.obstacles += 1;

                if rng.random_bool(tuning.boost_spawn_chance.clamp(0.0, 1.0)) {
                    spawn_boost(registry, rng, tuning.spawn_depth);
                    report.boosts += 1;
                }
            }
        }

        self.crystal_timer_ms += dt_ms;
        if self.crystal_timer_ms >= tuning.crystal_interval_ms {
            self.crystal_timer_ms = 0.0;
            report.crystals += spawn_crystal_row(registry, rng, tuning);
        }

        if report != SpawnReport::default() {
            log::trace!(
                "Spawned {} obstacles, {} boosts, {} crystals at {:.0}ms",
                report.obstacles,
                report.boosts,
                report.crystals,
                elapsed_ms
            );
        }
        report
    }
}

fn random_lane(rng: &mut Pcg32) -> u8 {
    rng.random_range(0..LANE_COUNT)
}

fn spawn_obstacle(registry: &mut EntityRegistry, rng: &mut Pcg32, depth: f32) {
    let lane = random_lane(rng);
    let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
    registry.spawn_obstacle(kind, lane, depth);
}

fn spawn_boost(registry: &mut EntityRegistry, rng: &mut Pcg32, depth: f32) {
    let lane = random_lane(rng);
    let kind = BoostKind::ALL[rng.random_range(0..BoostKind::ALL.len())];
    log::debug!("Boost {:?} spawned in lane {}", kind, lane);
    registry.spawn_boost(kind, lane, depth);
}

/// A line of crystals trailing back from the horizon in one lane
fn spawn_crystal_row(registry: &mut EntityRegistry, rng: &mut Pcg32, tuning: &Tuning) -> u32 {
    let lane = random_lane(rng);
    for i in 0..tuning.crystal_row_count {
        let depth = tuning.spawn_depth - i as f32 * tuning.crystal_spacing;
        registry.spawn_crystal(lane, depth);
    }
    tuning.crystal_row_count
}
