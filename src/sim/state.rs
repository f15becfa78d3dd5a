//! Game state and core simulation types
//!
//! Everything needed to reproduce a run lives here: seed, RNG stream, tuning,
//! upgrade levels and the per-component state.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyCurve;
use super::entities::{BoostKind, EntityRegistry, ObstacleKind};
use super::player::{Player, PlayerTimings};
use super::scoring::Scoreboard;
use super::spawner::Spawner;
use crate::telemetry::TelemetryLog;
use crate::tuning::Tuning;

/// Run-level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Grace period: no obstacles yet, pickups and scoring active
    Ready,
    /// Active gameplay
    Running,
    /// Everything frozen
    Paused,
    /// Run ended
    GameOver,
}

/// Purchased upgrade levels read from the profile at run start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    /// +10% crystal value per level
    pub crystal_bonus: u32,
    /// +1 shield charge per level
    pub shield: u32,
    /// Head start speed
    pub start_speed: u32,
    /// +20% magnet pull range per level
    pub magnet_radius: u32,
}

/// Discrete things that happened during a tick, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Slid,
    LaneChanged { lane: u8 },
    CrystalCollected { id: u32, points: u64 },
    BoostActivated { kind: BoostKind },
    BoostExpired { kind: BoostKind },
    ObstacleHit { kind: ObstacleKind, hit_points: u8 },
    ShieldBlocked { kind: ObstacleKind, charges_left: u32 },
    NearMiss { kind: ObstacleKind, points: u64 },
    ComboUp { level: usize, multiplier: u32 },
    PhaseChanged { phase: RunPhase },
    GameOver { score: u64, crystals: u32 },
}

/// Timed boost effects (the shield lives on the player as charges)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub magnet_ms: f32,
    pub slow_ms: f32,
}

impl ActiveEffects {
    pub fn magnet_on(&self) -> bool {
        self.magnet_ms > 0.0
    }

    pub fn slow_on(&self) -> bool {
        self.slow_ms > 0.0
    }

    /// Count both timers down; returns the kinds that expired this call
    pub fn tick(&mut self, dt_ms: f32) -> Vec<BoostKind> {
        let mut expired = Vec::new();
        if self.magnet_on() {
            self.magnet_ms = (self.magnet_ms - dt_ms).max(0.0);
            if !self.magnet_on() {
                expired.push(BoostKind::Magnet);
            }
        }
        if self.slow_on() {
            self.slow_ms = (self.slow_ms - dt_ms).max(0.0);
            if !self.slow_on() {
                expired.push(BoostKind::SlowTime);
            }
        }
        expired
    }
}

/// Final numbers of a finished (or abandoned) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub crystals: u32,
    pub near_misses: u32,
    pub distance: f32,
    pub duration_ms: f32,
    pub best_streak: u32,
    pub frames: u64,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn RNG stream
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub upgrades: UpgradeLevels,
    pub curve: DifficultyCurve,
    pub phase: RunPhase,
    /// Unpaused run time
    pub elapsed_ms: f32,
    /// Simulated frame counter
    pub frame: u64,
    /// Effective speed used by the last frame
    pub speed: f32,
    pub player: Player,
    pub registry: EntityRegistry,
    pub spawner: Spawner,
    pub effects: ActiveEffects,
    pub board: Scoreboard,
    pub telemetry: TelemetryLog,
    /// Events produced by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// New run with default tuning and no upgrades
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), UpgradeLevels::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, upgrades: UpgradeLevels) -> Self {
        let curve = DifficultyCurve::new(&tuning, upgrades.start_speed);
        log::info!(
            "Run starting: seed={} upgrades={:?} start speed={:.2}",
            seed,
            upgrades,
            curve.speed(0.0)
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(PlayerTimings::from(&tuning)),
            registry: EntityRegistry::new(),
            spawner: Spawner::new(&curve),
            effects: ActiveEffects::default(),
            board: Scoreboard::new(&tuning, upgrades.crystal_bonus),
            telemetry: TelemetryLog::default(),
            events: Vec::new(),
            phase: RunPhase::Ready,
            elapsed_ms: 0.0,
            frame: 0,
            speed: curve.speed(0.0),
            curve,
            upgrades,
            tuning,
        }
    }

    /// Start over with a new seed, keeping tuning and upgrades
    pub fn restart(&mut self, seed: u64) {
        *self = Self::with_config(seed, self.tuning.clone(), self.upgrades);
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    /// Shield charges granted by a shield boost
    pub fn shield_charges(&self) -> u32 {
        1 + self.upgrades.shield
    }

    /// Depth distance the magnet pulls from
    pub fn magnet_range(&self) -> f32 {
        self.tuning.magnet_pull_range
            * (1.0 + self.upgrades.magnet_radius as f32 * self.tuning.magnet_range_per_level)
    }

    pub(crate) fn set_phase(&mut self, phase: RunPhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?} at {:.0}ms", self.phase, phase, self.elapsed_ms);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged { phase });
        }
    }

    /// Phase to return to when leaving pause
    pub(crate) fn active_phase(&self) -> RunPhase {
        if self.curve.in_grace_period(self.elapsed_ms) {
            RunPhase::Ready
        } else {
            RunPhase::Running
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            score: self.board.score,
            crystals: self.board.crystals,
            near_misses: self.board.near_misses,
            distance: self.board.distance,
            duration_ms: self.elapsed_ms,
            best_streak: self.board.combo.best_streak,
            frames: self.frame,
        }
    }
}
