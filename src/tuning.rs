//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives in [`Tuning`]. The
//! defaults reproduce the shipped balance; a JSON document may override any
//! subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// One row of the combo table: reaching `streak` pickups unlocks `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboStep {
    pub streak: u32,
    pub multiplier: u32,
}

/// Errors raised while loading a tuning document.
#[derive(Debug, Error)]
pub enum TuningError {
    /// JSON could not be parsed into a tuning document.
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The combo table is empty or does not start at a zero streak.
    #[error("combo table must be non-empty and start at streak 0")]
    ComboTableStart,

    /// Combo breakpoints must strictly increase and multipliers must not shrink.
    #[error("combo table is not ordered at row {row}")]
    ComboTableOrder { row: usize },

    /// A min/max pair is inverted.
    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },

    /// A value that must be strictly positive is not.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Depth layout ===
    pub player_depth: f32,
    pub spawn_depth: f32,
    pub despawn_depth: f32,
    pub collision_range: f32,
    /// Extra depth tolerance for crystals on top of `collision_range`
    pub crystal_pickup_slack: f32,
    /// Extra depth tolerance for boosts on top of `collision_range`
    pub boost_pickup_slack: f32,

    // === Player ===
    pub lane_switch_ms: f32,
    pub jump_ms: f32,
    pub slide_ms: f32,
    pub starting_hit_points: u8,

    // === Speed / difficulty ===
    /// Depth units per second
    pub base_speed: f32,
    pub max_speed: f32,
    pub speed_increment: f32,
    pub speed_interval_ms: f32,
    /// Speed added per Head Start upgrade level
    pub start_speed_per_level: f32,
    pub grace_period_ms: f32,
    pub obstacle_interval_min_ms: f32,
    pub obstacle_interval_max_ms: f32,

    // === Crystals ===
    pub crystal_row_count: u32,
    pub crystal_spacing: f32,
    pub crystal_interval_ms: f32,
    pub crystal_score: u32,
    /// Crystal value bonus per Crystal Bonus upgrade level (0.1 = +10%)
    pub crystal_bonus_per_level: f32,

    // === Boosts ===
    pub boost_spawn_chance: f64,
    pub magnet_duration_ms: f32,
    pub slow_duration_ms: f32,
    pub slow_factor: f32,
    /// Depth distance inside which the magnet pulls crystals
    pub magnet_pull_range: f32,
    /// Pull range bonus per Magnet Radius upgrade level (0.2 = +20%)
    pub magnet_range_per_level: f32,
    /// Fraction of the lane gap closed per reference frame
    pub magnet_lane_ease: f32,
    /// Fraction of the depth gap closed per reference frame
    pub magnet_depth_ease: f32,
    pub magnet_reference_frame_ms: f32,
    /// Lane gap under which a pulled crystal snaps onto the player's lane
    pub magnet_lane_snap: f32,

    // === Scoring ===
    pub distance_quantum: f32,
    pub distance_points: u32,
    pub near_miss_points: u32,
    pub combo_table: Vec<ComboStep>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_depth: PLAYER_DEPTH,
            spawn_depth: SPAWN_DEPTH,
            despawn_depth: DESPAWN_DEPTH,
            collision_range: COLLISION_RANGE,
            crystal_pickup_slack: 0.03,
            boost_pickup_slack: 0.02,

            lane_switch_ms: LANE_SWITCH_MS,
            jump_ms: JUMP_MS,
            slide_ms: SLIDE_MS,
            starting_hit_points: STARTING_HIT_POINTS,

            base_speed: 0.3,
            max_speed: 0.9,
            speed_increment: 0.03,
            speed_interval_ms: 8000.0,
            start_speed_per_level: 0.05,
            grace_period_ms: 3500.0,
            obstacle_interval_min_ms: 1200.0,
            obstacle_interval_max_ms: 2800.0,

            crystal_row_count: 4,
            crystal_spacing: 0.05,
            crystal_interval_ms: 1800.0,
            crystal_score: 50,
            crystal_bonus_per_level: 0.1,

            boost_spawn_chance: 0.08,
            magnet_duration_ms: 5000.0,
            slow_duration_ms: 3000.0,
            slow_factor: 0.5,
            magnet_pull_range: 0.3,
            magnet_range_per_level: 0.2,
            magnet_lane_ease: 0.15,
            magnet_depth_ease: 0.1,
            magnet_reference_frame_ms: FRAME_DT_MS,
            magnet_lane_snap: 0.05,

            distance_quantum: 0.1,
            distance_points: 10,
            near_miss_points: 25,
            combo_table: vec![
                ComboStep { streak: 0, multiplier: 1 },
                ComboStep { streak: 5, multiplier: 2 },
                ComboStep { streak: 15, multiplier: 3 },
                ComboStep { streak: 30, multiplier: 5 },
            ],
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        match self.combo_table.first() {
            Some(first) if first.streak == 0 => {}
            _ => return Err(TuningError::ComboTableStart),
        }
        for (row, pair) in self.combo_table.windows(2).enumerate() {
            if pair[1].streak <= pair[0].streak || pair[1].multiplier < pair[0].multiplier {
                return Err(TuningError::ComboTableOrder { row: row + 1 });
            }
        }
        if self.base_speed > self.max_speed {
            return Err(TuningError::InvertedRange {
                field: "speed",
                min: self.base_speed,
                max: self.max_speed,
            });
        }
        if self.obstacle_interval_min_ms > self.obstacle_interval_max_ms {
            return Err(TuningError::InvertedRange {
                field: "obstacle_interval_ms",
                min: self.obstacle_interval_min_ms,
                max: self.obstacle_interval_max_ms,
            });
        }
        for (field, value) in [
            ("distance_quantum", self.distance_quantum),
            ("speed_interval_ms", self.speed_interval_ms),
            ("crystal_interval_ms", self.crystal_interval_ms),
            ("magnet_reference_frame_ms", self.magnet_reference_frame_ms),
        ] {
            if value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
