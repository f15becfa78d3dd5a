//! Perspective projection for the behind-the-runner camera
//!
//! The track is a trapezoid that narrows toward the horizon. A world point is
//! a (lane, depth) pair: lane 0..2 across the track (fractional values are
//! allowed) and depth 0 at the horizon growing toward the camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Screen geometry of the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Vanishing point
    pub center_x: f32,
    pub horizon_y: f32,
    /// Track width at the horizon
    pub top_width: f32,
    /// Track width at the bottom edge
    pub bottom_width: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            center_x: HORIZON_X,
            horizon_y: HORIZON_Y,
            top_width: TRACK_TOP_WIDTH,
            bottom_width: TRACK_BOTTOM_WIDTH,
        }
    }
}

/// A projected world point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projected {
    pub pos: Vec2,
    pub scale: f32,
}

impl Viewport {
    /// Track half-width at a given depth
    #[inline]
    pub fn half_width_at(&self, depth: f32) -> f32 {
        let t = depth.clamp(0.0, MAX_PROJECTED_DEPTH);
        self.top_width / 2.0 + t * (self.bottom_width - self.top_width) / 2.0
    }

    /// Map (lane, depth) to a screen position and sprite scale
    pub fn project(&self, lane: f32, depth: f32) -> Projected {
        let t = depth.clamp(0.0, MAX_PROJECTED_DEPTH);
        let y = self.horizon_y + t * (self.height - self.horizon_y);
        let lane_offset = (lane - CENTER_LANE as f32) * self.half_width_at(t) * LANE_SPREAD;
        Projected {
            pos: Vec2::new(self.center_x + lane_offset, y),
            scale: depth_scale(t),
        }
    }
}

/// Sprite scale at a depth: 0.15 at the horizon, 1.0 at depth 1
#[inline]
pub fn depth_scale(depth: f32) -> f32 {
    0.15 + depth.clamp(0.0, MAX_PROJECTED_DEPTH) * 0.85
}

/// Project onto the default 800x600 viewport
#[inline]
pub fn project(lane: f32, depth: f32) -> Projected {
    Viewport::default().project(lane, depth)
}
