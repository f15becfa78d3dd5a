//! Whole-run scenarios driven through `tick`

use frost_rush::Tuning;
use frost_rush::consts::FRAME_DT_MS;
use frost_rush::persistence::{
    CRYSTAL_BANK_KEY, KeyValueStore, MemoryStore, Profile, UpgradeKind, purchase, record_run,
};
use frost_rush::sim::{
    BoostKind, GameEvent, GameState, ObstacleKind, RunPhase, TickInput, UpgradeLevels, tick,
};
use frost_rush::telemetry::{RunLogs, TelemetryKind, ValidationLimits, validate_run};

/// No random spawns: scenarios place every entity themselves
fn quiet_tuning() -> Tuning {
    Tuning {
        grace_period_ms: f32::MAX,
        crystal_interval_ms: f32::MAX,
        ..Tuning::default()
    }
}

fn quiet_state() -> GameState {
    GameState::with_config(1, quiet_tuning(), UpgradeLevels::default())
}

fn demo_input() -> TickInput {
    TickInput {
        idle_mode: true,
        ..Default::default()
    }
}

/// Tick until `done` or the frame budget runs out, collecting all events
fn run_until(
    state: &mut GameState,
    frames: usize,
    dt_ms: f32,
    mut done: impl FnMut(&GameState) -> bool,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        tick(state, &TickInput::default(), dt_ms);
        events.extend(state.events.iter().cloned());
        if done(state) {
            break;
        }
    }
    events
}

#[test]
fn crystal_row_collected_in_order() {
    let mut state = quiet_state();
    let ids: Vec<u32> = (0..4)
        .map(|i| state.registry.spawn_crystal(1, 0.5 - i as f32 * 0.05))
        .collect();

    let events = run_until(&mut state, 600, FRAME_DT_MS, |s| s.registry.is_empty());
    let collected: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::CrystalCollected { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(collected, ids);
    assert_eq!(state.board.crystals, 4);
    assert_eq!(state.telemetry.count(TelemetryKind::Collect), 4);
}

#[test]
fn magnet_pulls_crystal_from_neighbour_lane() {
    let mut state = quiet_state();
    state.effects.magnet_ms = state.tuning.magnet_duration_ms;
    state.registry.spawn_crystal(0, 0.6);

    let events = run_until(&mut state, 300, FRAME_DT_MS, |s| s.board.crystals > 0);
    assert_eq!(state.board.crystals, 1);
    assert_eq!(state.player.lane, 1);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GameEvent::LaneChanged { .. }))
    );
}

#[test]
fn slow_time_halves_speed_then_reverts() {
    let mut state = quiet_state();
    let base = state.tuning.base_speed;
    state.registry.spawn_boost(BoostKind::SlowTime, 1, state.tuning.player_depth);
    tick(&mut state, &TickInput::default(), 0.0);
    assert!(state.effects.slow_on());

    let mut expired_at = None;
    for frame in 1..=40 {
        tick(&mut state, &TickInput::default(), 100.0);
        if expired_at.is_none() {
            assert_eq!(state.speed, base * state.tuning.slow_factor);
        } else {
            assert_eq!(state.speed, base);
        }
        if state.events.contains(&GameEvent::BoostExpired {
            kind: BoostKind::SlowTime,
        }) {
            expired_at = Some(frame);
        }
    }
    assert_eq!(expired_at, Some(30));
}

#[test]
fn three_hits_end_the_run_once() {
    let mut state = quiet_state();
    let mut events = Vec::new();
    for _ in 0..3 {
        state
            .registry
            .spawn_obstacle(ObstacleKind::SlidingBlock, 1, state.tuning.player_depth);
        events.extend(run_until(&mut state, 1, FRAME_DT_MS, |_| true));
        // Let the struck obstacle clear the window
        events.extend(run_until(&mut state, 60, FRAME_DT_MS, |_| false));
    }
    events.extend(run_until(&mut state, 60, FRAME_DT_MS, |_| false));

    let game_overs = events
        .iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
    assert_eq!(state.phase, RunPhase::GameOver);
    assert!(state.player.is_dead());
    assert_eq!(state.telemetry.count(TelemetryKind::Hit), 3);
}

#[test]
fn shield_upgrade_soaks_extra_hits() {
    let upgrades = UpgradeLevels {
        shield: 2,
        ..Default::default()
    };
    let mut state = GameState::with_config(1, quiet_tuning(), upgrades);
    let depth = state.tuning.player_depth;
    state.registry.spawn_boost(BoostKind::Shield, 1, depth);
    tick(&mut state, &TickInput::default(), 0.0);
    assert_eq!(state.player.shield_charges, 3);

    for _ in 0..3 {
        state.registry.spawn_obstacle(ObstacleKind::IceSpike, 1, depth);
        tick(&mut state, &TickInput::default(), 0.0);
        state.registry.obstacles.clear();
    }
    assert_eq!(state.board.hit_points, 3);
    assert!(!state.player.shield_active());
}

#[test]
fn distance_score_tracks_depth_traveled() {
    let mut state = quiet_state();
    run_until(&mut state, 2000, FRAME_DT_MS, |_| false);
    let quanta = (state.board.distance / state.tuning.distance_quantum).floor() as i64;
    let earned = (state.board.score / 10) as i64;
    assert!((quanta - earned).abs() <= 1, "{quanta} vs {earned}");
    assert!(state.board.score > 0);
}

#[test]
fn same_seed_same_run() {
    let play = |seed: u64| {
        let mut state = GameState::new(seed);
        for _ in 0..5000 {
            tick(&mut state, &demo_input(), FRAME_DT_MS);
            if state.is_over() {
                break;
            }
        }
        (state.summary(), state.telemetry)
    };
    assert_eq!(play(2024), play(2024));
}

#[test]
fn pausing_does_not_change_the_outcome() {
    let mut plain = GameState::new(77);
    let mut paused = GameState::new(77);
    let toggle = TickInput {
        toggle_pause: true,
        idle_mode: true,
        ..Default::default()
    };

    for frame in 0..3000 {
        tick(&mut plain, &demo_input(), FRAME_DT_MS);
        if frame % 500 == 250 {
            tick(&mut paused, &toggle, FRAME_DT_MS);
            if !paused.is_over() {
                assert_eq!(paused.phase, RunPhase::Paused);
            }
            for _ in 0..10 {
                tick(&mut paused, &demo_input(), FRAME_DT_MS);
            }
            tick(&mut paused, &toggle, FRAME_DT_MS);
        } else {
            tick(&mut paused, &demo_input(), FRAME_DT_MS);
        }
    }

    assert_eq!(plain.summary(), paused.summary());
    assert_eq!(plain.telemetry, paused.telemetry);
}

#[test]
fn demo_run_telemetry_matches_board() {
    let mut state = GameState::new(9);
    for _ in 0..6000 {
        tick(&mut state, &demo_input(), FRAME_DT_MS);
        if state.is_over() {
            break;
        }
    }
    let logs = RunLogs::from(&state);
    assert_eq!(
        state.telemetry.count(TelemetryKind::Collect),
        state.board.crystals as usize
    );
    let lenient = ValidationLimits {
        max_score_per_second: f64::MAX,
        ..Default::default()
    };
    assert_eq!(validate_run(&logs, &lenient), Ok(()));
}

#[test]
fn profile_round_trip_through_a_run() {
    let mut store = MemoryStore::default();
    store.set(CRYSTAL_BANK_KEY, "100");
    assert_eq!(purchase(&mut store, UpgradeKind::StartSpeed), Ok(1));

    let profile = Profile::load(&store);
    assert_eq!(profile.upgrades.start_speed, 1);
    let mut state = GameState::with_config(3, Tuning::default(), profile.upgrades);
    assert!((state.speed - 0.35).abs() < 1e-6);

    for _ in 0..600 {
        tick(&mut state, &demo_input(), FRAME_DT_MS);
    }
    let record = record_run(&mut store, &state.summary());
    assert!(record.new_best);
    assert_eq!(record.crystal_bank, 80 + state.board.crystals as u64);
}
