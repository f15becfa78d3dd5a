//! Read-only per-frame view for renderers
//!
//! Built after `tick`; nothing here feeds back into the simulation.

use serde::Serialize;

use super::entities::{BoostKind, ObstacleKind};
use super::player::Pose;
use super::projection::{Projected, Viewport};
use super::state::{GameState, RunPhase};
use crate::consts::HIT_FLASH_MS;

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Dodge prompt shown above the obstacle
    pub hint: &'static str,
    pub lane: u8,
    pub depth: f32,
    pub screen: Projected,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrystalView {
    pub id: u32,
    pub lane: f32,
    pub depth: f32,
    pub screen: Projected,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoostView {
    pub id: u32,
    pub kind: BoostKind,
    pub lane: u8,
    pub depth: f32,
    pub screen: Projected,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub lane: u8,
    pub pose: Pose,
    /// Lane position eased through a lane switch
    pub visual_lane: f32,
    /// Upward sprite offset in pixels
    pub jump_offset: f32,
    pub lean_degrees: f32,
    /// 0..1, fades out after a hit or block
    pub flash: f32,
    pub shield_charges: u32,
    pub screen: Projected,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub score: u64,
    pub crystals: u32,
    pub hit_points: u8,
    pub multiplier: u32,
    pub streak: u32,
    pub speed: f32,
    /// Progress from base to max speed, 0..1
    pub difficulty: f32,
    pub elapsed_ms: f32,
    /// Remaining magnet time, 0 when inactive
    pub magnet_ms: f32,
    /// Remaining slow-time, 0 when inactive
    pub slow_ms: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub phase: RunPhase,
    pub player: PlayerView,
    pub obstacles: Vec<ObstacleView>,
    pub crystals: Vec<CrystalView>,
    pub boosts: Vec<BoostView>,
    pub hud: Hud,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState, viewport: &Viewport) -> Self {
        let player = &state.player;
        let visual_lane = player.visual_lane();
        let mut player_screen = viewport.project(visual_lane, state.tuning.player_depth);
        player_screen.pos.y -= player.jump_offset();

        Self {
            frame: state.frame,
            phase: state.phase,
            player: PlayerView {
                lane: player.lane,
                pose: player.pose,
                visual_lane,
                jump_offset: player.jump_offset(),
                lean_degrees: player.lean_degrees(),
                flash: (player.flash_ms / HIT_FLASH_MS).clamp(0.0, 1.0),
                shield_charges: player.shield_charges,
                screen: player_screen,
            },
            obstacles: state
                .registry
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: o.kind,
                    hint: o.kind.hint(),
                    lane: o.lane,
                    depth: o.depth,
                    screen: viewport.project(o.lane as f32, o.depth),
                })
                .collect(),
            crystals: state
                .registry
                .active_crystals()
                .map(|c| CrystalView {
                    id: c.id,
                    lane: c.lane,
                    depth: c.depth,
                    screen: viewport.project(c.lane, c.depth),
                })
                .collect(),
            boosts: state
                .registry
                .active_boosts()
                .map(|b| BoostView {
                    id: b.id,
                    kind: b.kind,
                    lane: b.lane,
                    depth: b.depth,
                    screen: viewport.project(b.lane as f32, b.depth),
                })
                .collect(),
            hud: Hud {
                score: state.board.score,
                crystals: state.board.crystals,
                hit_points: state.board.hit_points,
                multiplier: state.board.combo.multiplier,
                streak: state.board.combo.streak,
                speed: state.speed,
                difficulty: state.curve.difficulty_ratio(state.elapsed_ms),
                elapsed_ms: state.elapsed_ms,
                magnet_ms: state.effects.magnet_ms,
                slow_ms: state.effects.slow_ms,
            },
        }
    }
}
