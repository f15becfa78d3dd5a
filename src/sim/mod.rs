//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame deltas only, no wall clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod difficulty;
pub mod entities;
pub mod player;
pub mod projection;
pub mod scoring;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{ContactWindow, Interaction, resolve};
pub use difficulty::DifficultyCurve;
pub use entities::{
    Avoidance, Boost, BoostKind, Crystal, EntityRegistry, MagnetPull, Obstacle, ObstacleKind,
};
pub use player::{HitOutcome, Player, PlayerTimings, Pose};
pub use projection::{Projected, Viewport, depth_scale, project};
pub use scoring::{Combo, Scoreboard, combo_for_streak};
pub use snapshot::RenderSnapshot;
pub use spawner::Spawner;
pub use state::{ActiveEffects, GameEvent, GameState, RunPhase, RunSummary, UpgradeLevels};
pub use tick::{TickInput, tick};
