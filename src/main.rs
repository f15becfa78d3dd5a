//! Frost Rush headless runner
//!
//! Plays seeded demo runs with the autopilot, applies the results to a
//! profile and prints a JSON report per run.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use frost_rush::Tuning;
use frost_rush::audio::{AudioManager, LogAudio};
use frost_rush::consts::*;
use frost_rush::persistence::{
    JsonFileStore, KeyValueStore, MemoryStore, Profile, RunRecord, record_run,
};
use frost_rush::sim::{GameState, RunSummary, TickInput, tick};
use frost_rush::telemetry::{RunLogs, ValidationLimits, validate_run};

#[derive(Parser, Debug)]
#[command(name = "frost-rush")]
#[command(about = "Run seeded Frost Rush demo games headlessly")]
struct Cli {
    /// Run seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of consecutive runs; each uses the next seed
    #[arg(long, default_value_t = 1)]
    runs: u32,
    /// Stop a run after this many simulated seconds
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,
    /// Frame delta in milliseconds
    #[arg(long, default_value_t = FRAME_DT_MS)]
    dt_ms: f32,
    /// JSON tuning overrides
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// JSON profile store; in-memory when omitted
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    summary: RunSummary,
    record: RunRecord,
    /// Validator verdict, `None` when accepted
    rejected: Option<String>,
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {}", path.display()))?;
    let tuning = Tuning::from_json(&json)
        .with_context(|| format!("invalid tuning file {}", path.display()))?;
    log::info!("Loaded tuning from {}", path.display());
    Ok(tuning)
}

/// Drive one run to game over (or the time cap) with the autopilot
fn play(state: &mut GameState, dt_ms: f32, max_ms: f32, audio: &AudioManager) {
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut sink = LogAudio;
    let dt_ms = dt_ms.clamp(1.0, MAX_FRAME_DT_MS);
    while !state.is_over() && state.elapsed_ms < max_ms {
        tick(state, &input, dt_ms);
        audio.dispatch(&state.events, &mut sink);
    }
}

fn run_once(
    seed: u64,
    tuning: &Tuning,
    store: &mut dyn KeyValueStore,
    cli: &Cli,
    audio: &AudioManager,
) -> RunReport {
    let profile = Profile::load(store);
    let mut state = GameState::with_config(seed, tuning.clone(), profile.upgrades);
    play(&mut state, cli.dt_ms, cli.max_seconds * 1000.0, audio);

    let summary = state.summary();
    let record = record_run(store, &summary);
    let rejected = validate_run(&RunLogs::from(&state), &ValidationLimits::default())
        .err()
        .map(|e| {
            log::warn!("Run {} rejected: {}", seed, e);
            e.to_string()
        });
    RunReport {
        summary,
        record,
        rejected,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Frost Rush (headless) starting...");

    let tuning = load_tuning(cli.tuning.as_ref())?;
    let seed = cli.seed.unwrap_or_else(time_seed);
    let audio = AudioManager::new();

    let mut file_store = match &cli.profile {
        Some(path) => Some(JsonFileStore::open(path)?),
        None => None,
    };
    let mut memory_store = MemoryStore::default();

    for i in 0..cli.runs {
        let run_seed = seed.wrapping_add(i as u64);
        let store: &mut dyn KeyValueStore = match file_store.as_mut() {
            Some(store) => store,
            None => &mut memory_store,
        };
        let report = run_once(run_seed, &tuning, store, &cli, &audio);
        println!("{}", serde_json::to_string(&report)?);
    }

    if let Some(store) = file_store.as_mut() {
        store.save()?;
    }
    Ok(())
}
