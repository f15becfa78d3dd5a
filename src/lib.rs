//! Frost Rush - simulation core for a three-lane endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (projection, player, entities, collisions, scoring)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Injected key-value store, profile load and run finalize
//! - `telemetry`: Gameplay event log and run validation
//! - `audio`: Mapping of gameplay events to sound cues

pub mod audio;
pub mod persistence;
pub mod sim;
pub mod telemetry;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame step used by the headless runner (60 Hz, in milliseconds)
    pub const FRAME_DT_MS: f32 = 1000.0 / 60.0;
    /// Largest frame delta accepted by the runner before clamping
    pub const MAX_FRAME_DT_MS: f32 = 100.0;

    /// Logical screen size
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    /// Vanishing point
    pub const HORIZON_X: f32 = SCREEN_WIDTH / 2.0;
    pub const HORIZON_Y: f32 = 160.0;
    /// Track width at the horizon and at the bottom edge
    pub const TRACK_TOP_WIDTH: f32 = 90.0;
    pub const TRACK_BOTTOM_WIDTH: f32 = 750.0;
    /// Lane spread relative to track half-width
    pub const LANE_SPREAD: f32 = 0.55;
    /// Depth clamp used by projection
    pub const MAX_PROJECTED_DEPTH: f32 = 1.2;

    pub const LANE_COUNT: u8 = 3;
    pub const CENTER_LANE: u8 = 1;

    /// Depth plane the player runs on
    pub const PLAYER_DEPTH: f32 = 0.82;
    pub const SPAWN_DEPTH: f32 = 0.0;
    pub const DESPAWN_DEPTH: f32 = 1.15;
    /// Half-range around the player plane that counts as contact
    pub const COLLISION_RANGE: f32 = 0.07;

    /// Player animation
    pub const LANE_SWITCH_MS: f32 = 100.0;
    pub const JUMP_MS: f32 = 400.0;
    pub const JUMP_HEIGHT: f32 = 140.0;
    pub const SLIDE_MS: f32 = 450.0;
    pub const HIT_FLASH_MS: f32 = 480.0;
    pub const LANE_LEAN_DEGREES: f32 = 5.0;

    pub const STARTING_HIT_POINTS: u8 = 3;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of the remaining distance covered after `dt_ms` when a fixed
/// per-frame easing `factor` is tuned for `reference_ms` frames.
#[inline]
pub fn frame_independent_ease(factor: f32, dt_ms: f32, reference_ms: f32) -> f32 {
    if dt_ms <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - factor.clamp(0.0, 1.0)).powf(dt_ms / reference_ms)
}
