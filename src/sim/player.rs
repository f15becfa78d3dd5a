//! Runner state: lane, pose, shield charges and animation clocks
//!
//! Every operation is a no-op when it conflicts with the current state and
//! reports whether it took effect. Animation is sampled from state plus
//! elapsed time instead of being driven by callbacks.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::lerp;
use crate::tuning::Tuning;

/// Vertical pose of the runner (mutually exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pose {
    Grounded,
    /// Airborne, `elapsed_ms` into the jump arc
    Jumping { elapsed_ms: f32 },
    /// Ducking, `remaining_ms` left
    Sliding { remaining_ms: f32 },
    Dead,
}

/// An in-progress lane change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneTransition {
    pub from: u8,
    pub elapsed_ms: f32,
}

/// Durations the player reads on every update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTimings {
    pub lane_switch_ms: f32,
    pub jump_ms: f32,
    pub slide_ms: f32,
}

impl Default for PlayerTimings {
    fn default() -> Self {
        Self {
            lane_switch_ms: LANE_SWITCH_MS,
            jump_ms: JUMP_MS,
            slide_ms: SLIDE_MS,
        }
    }
}

impl From<&Tuning> for PlayerTimings {
    fn from(tuning: &Tuning) -> Self {
        Self {
            lane_switch_ms: tuning.lane_switch_ms,
            jump_ms: tuning.jump_ms,
            slide_ms: tuning.slide_ms,
        }
    }
}

/// Result of a hit landing on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// A shield charge soaked the hit
    Absorbed { charges_left: u32 },
    /// No shield; the caller applies damage
    NotAbsorbed,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub lane: u8,
    pub pose: Pose,
    pub transition: Option<LaneTransition>,
    pub shield_charges: u32,
    /// Time alive this run (drives idle animation)
    pub elapsed_ms: f32,
    /// Remaining hit/shield flash time
    pub flash_ms: f32,
    timings: PlayerTimings,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlayerTimings::default())
    }
}

impl Player {
    pub fn new(timings: PlayerTimings) -> Self {
        Self {
            lane: CENTER_LANE,
            pose: Pose::Grounded,
            transition: None,
            shield_charges: 0,
            elapsed_ms: 0.0,
            flash_ms: 0.0,
            timings,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.pose == Pose::Dead
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.pose, Pose::Jumping { .. })
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.pose, Pose::Sliding { .. })
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn shield_active(&self) -> bool {
        self.shield_charges > 0
    }

    pub fn move_left(&mut self) -> bool {
        if self.lane == 0 {
            return false;
        }
        self.shift_lane(self.lane - 1)
    }

    pub fn move_right(&mut self) -> bool {
        if self.lane + 1 >= LANE_COUNT {
            return false;
        }
        self.shift_lane(self.lane + 1)
    }

    fn shift_lane(&mut self, target: u8) -> bool {
        if self.is_dead() || self.is_transitioning() {
            return false;
        }
        self.transition = Some(LaneTransition {
            from: self.lane,
            elapsed_ms: 0.0,
        });
        self.lane = target;
        true
    }

    pub fn jump(&mut self) -> bool {
        if self.pose != Pose::Grounded {
            return false;
        }
        self.pose = Pose::Jumping { elapsed_ms: 0.0 };
        true
    }

    pub fn slide(&mut self) -> bool {
        if self.pose != Pose::Grounded {
            return false;
        }
        self.pose = Pose::Sliding {
            remaining_ms: self.timings.slide_ms,
        };
        true
    }

    /// Grant shield charges (replaces any remaining charges)
    pub fn raise_shield(&mut self, charges: u32) {
        self.shield_charges = charges;
    }

    /// Spend a shield charge on an incoming hit if one is available
    pub fn absorb_hit(&mut self) -> HitOutcome {
        self.flash_ms = HIT_FLASH_MS;
        if self.shield_charges > 0 {
            self.shield_charges -= 1;
            HitOutcome::Absorbed {
                charges_left: self.shield_charges,
            }
        } else {
            HitOutcome::NotAbsorbed
        }
    }

    /// Terminal: clears all transient state
    pub fn die(&mut self) {
        self.pose = Pose::Dead;
        self.transition = None;
        self.shield_charges = 0;
    }

    /// Back to the start-of-run state
    pub fn reset(&mut self) {
        *self = Self::new(self.timings);
    }

    /// Advance jump, slide, lane and flash timers
    pub fn update(&mut self, dt_ms: f32) {
        if self.is_dead() {
            return;
        }
        self.elapsed_ms += dt_ms;
        self.flash_ms = (self.flash_ms - dt_ms).max(0.0);

        match &mut self.pose {
            Pose::Jumping { elapsed_ms } => {
                *elapsed_ms += dt_ms;
                if *elapsed_ms >= self.timings.jump_ms {
                    self.pose = Pose::Grounded;
                }
            }
            Pose::Sliding { remaining_ms } => {
                *remaining_ms -= dt_ms;
                if *remaining_ms <= 0.0 {
                    self.pose = Pose::Grounded;
                }
            }
            Pose::Grounded | Pose::Dead => {}
        }

        if let Some(transition) = &mut self.transition {
            transition.elapsed_ms += dt_ms;
            if transition.elapsed_ms >= self.timings.lane_switch_ms {
                self.transition = None;
            }
        }
    }

    /// Jump arc progress in [0, 1] (0 when not jumping)
    pub fn jump_progress(&self) -> f32 {
        match self.pose {
            Pose::Jumping { elapsed_ms } => (elapsed_ms / self.timings.jump_ms).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Upward screen offset of the runner sprite (symmetric sine arc)
    pub fn jump_offset(&self) -> f32 {
        (self.jump_progress() * std::f32::consts::PI).sin() * JUMP_HEIGHT
    }

    /// Lane position for drawing, easing from the previous lane during a switch
    pub fn visual_lane(&self) -> f32 {
        match self.transition {
            Some(transition) => {
                let t = (transition.elapsed_ms / self.timings.lane_switch_ms).clamp(0.0, 1.0);
                let eased = 1.0 - (1.0 - t) * (1.0 - t);
                lerp(transition.from as f32, self.lane as f32, eased)
            }
            None => self.lane as f32,
        }
    }

    /// Body lean in degrees while switching lanes (positive leans right)
    pub fn lean_degrees(&self) -> f32 {
        let Some(transition) = self.transition else {
            return 0.0;
        };
        let half = self.timings.lane_switch_ms * 0.4;
        let p = transition.elapsed_ms / half;
        let amount = if p <= 1.0 { p } else { (2.0 - p).max(0.0) };
        let direction = if self.lane > transition.from { 1.0 } else { -1.0 };
        LANE_LEAN_DEGREES * amount * direction
    }
}
