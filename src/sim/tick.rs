//! Per-frame simulation step
//!
//! Fixed order inside one frame: input, difficulty, movement (entities,
//! effects, player timers), spawning, collision, scoring. Collisions always see
//! entities at their new depth; scoring always sees this frame's contacts.

use super::collision::{ContactWindow, Interaction, resolve};
use super::entities::{Avoidance, BoostKind, MagnetPull, ObstacleKind};
use super::player::HitOutcome;
use super::scoring::{Award, Damage};
use super::state::{GameEvent, GameState, RunPhase};
use crate::consts::LANE_COUNT;
use crate::frame_independent_ease;
use crate::telemetry::TelemetryKind;

/// Input commands for a single frame, one flag per input edge
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub slide: bool,
    /// Pause toggle
    pub toggle_pause: bool,
    /// Idle/demo mode - the autopilot plays
    pub idle_mode: bool,
}

/// Advance the game state by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    state.events.clear();

    if input.toggle_pause {
        match state.phase {
            RunPhase::Ready | RunPhase::Running => {
                state.set_phase(RunPhase::Paused);
                return;
            }
            RunPhase::Paused => {
                let resume = state.active_phase();
                state.set_phase(resume);
            }
            RunPhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if matches!(state.phase, RunPhase::Paused | RunPhase::GameOver) {
        return;
    }

    let dt_ms = dt_ms.max(0.0);
    let input = if input.idle_mode {
        autopilot(state)
    } else {
        input.clone()
    };
    apply_actions(state, &input);

    state.frame += 1;

    // --- DIFFICULTY ---
    state.elapsed_ms += dt_ms;
    if state.phase == RunPhase::Ready && !state.curve.in_grace_period(state.elapsed_ms) {
        state.set_phase(RunPhase::Running);
    }
    state.speed = state
        .curve
        .effective_speed(state.elapsed_ms, state.effects.slow_on());
    let dz = state.speed * dt_ms / 1000.0;

    // --- MOVEMENT ---
    state.registry.advance(dz, state.tuning.despawn_depth);
    if state.effects.magnet_on() {
        let pull = MagnetPull {
            target_lane: state.player.lane as f32,
            target_depth: state.tuning.player_depth,
            range: state.magnet_range(),
            lane_step: frame_independent_ease(
                state.tuning.magnet_lane_ease,
                dt_ms,
                state.tuning.magnet_reference_frame_ms,
            ),
            depth_step: frame_independent_ease(
                state.tuning.magnet_depth_ease,
                dt_ms,
                state.tuning.magnet_reference_frame_ms,
            ),
            snap: state.tuning.magnet_lane_snap,
        };
        state.registry.attract_crystals(pull);
    }
    for kind in state.effects.tick(dt_ms) {
        if kind == BoostKind::Magnet {
            state.registry.snap_crystal_lanes();
        }
        log::debug!("{:?} expired at {:.0}ms", kind, state.elapsed_ms);
        state.events.push(GameEvent::BoostExpired { kind });
    }
    state.player.update(dt_ms);

    // --- SPAWN ---
    let elapsed_ms = state.elapsed_ms;
    state.spawner.update(
        dt_ms,
        elapsed_ms,
        &state.curve,
        &state.tuning,
        &mut state.registry,
        &mut state.rng,
    );

    // --- COLLISION ---
    let window = ContactWindow::from(&state.tuning);
    let contacts = resolve(
        &state.player,
        state.effects.magnet_on(),
        &mut state.registry,
        window,
    );

    // --- SCORING ---
    for contact in contacts {
        if state.is_over() {
            break;
        }
        apply_contact(state, contact);
    }
    if !state.is_over() {
        state.board.add_distance(dz, &state.tuning);
    }
}

/// Discrete player commands; rejected commands leave no trace
fn apply_actions(state: &mut GameState, input: &TickInput) {
    let at_ms = state.elapsed_ms;
    if input.move_left && state.player.move_left() {
        state.events.push(GameEvent::LaneChanged {
            lane: state.player.lane,
        });
    }
    if input.move_right && state.player.move_right() {
        state.events.push(GameEvent::LaneChanged {
            lane: state.player.lane,
        });
    }
    if input.jump && state.player.jump() {
        state.events.push(GameEvent::Jumped);
        state.telemetry.record(at_ms, TelemetryKind::Jump);
    }
    if input.slide && state.player.slide() {
        state.events.push(GameEvent::Slid);
        state.telemetry.record(at_ms, TelemetryKind::Slide);
    }
}

fn apply_contact(state: &mut GameState, contact: Interaction) {
    match contact {
        Interaction::Strike { kind, .. } => strike(state, kind),
        Interaction::NearMiss { kind, .. } => {
            let award = state.board.near_miss(&state.tuning);
            state.events.push(GameEvent::NearMiss {
                kind,
                points: award.points,
            });
            push_combo_up(state, award);
        }
        Interaction::CrystalPickup { crystal } => {
            let award = state.board.collect_crystal(&state.tuning);
            state.telemetry.record(state.elapsed_ms, TelemetryKind::Collect);
            state.events.push(GameEvent::CrystalCollected {
                id: crystal,
                points: award.points,
            });
            push_combo_up(state, award);
        }
        Interaction::BoostPickup { kind, .. } => activate_boost(state, kind),
    }
}

fn push_combo_up(state: &mut GameState, award: Award) {
    if award.combo_up {
        let combo = &state.board.combo;
        log::debug!("Combo x{} (streak {})", combo.multiplier, combo.streak);
        state.events.push(GameEvent::ComboUp {
            level: combo.level,
            multiplier: combo.multiplier,
        });
    }
}

fn strike(state: &mut GameState, kind: ObstacleKind) {
    match state.player.absorb_hit() {
        HitOutcome::Absorbed { charges_left } => {
            log::debug!("Shield blocked {:?}, {} charges left", kind, charges_left);
            state.events.push(GameEvent::ShieldBlocked { kind, charges_left });
        }
        HitOutcome::NotAbsorbed => {
            state.telemetry.record(state.elapsed_ms, TelemetryKind::Hit);
            let damage = state.board.take_hit(&state.tuning);
            let hit_points = match damage {
                Damage::Survived { hit_points } => hit_points,
                Damage::Fatal => 0,
            };
            log::debug!("Hit by {:?}, {} HP left", kind, hit_points);
            state.events.push(GameEvent::ObstacleHit { kind, hit_points });
            if damage == Damage::Fatal {
                game_over(state);
            }
        }
    }
}

/// Same-kind pickups refresh rather than stack
fn activate_boost(state: &mut GameState, kind: BoostKind) {
    match kind {
        BoostKind::Shield => {
            let charges = state.shield_charges();
            state.player.raise_shield(charges);
        }
        BoostKind::Magnet => state.effects.magnet_ms = state.tuning.magnet_duration_ms,
        BoostKind::SlowTime => state.effects.slow_ms = state.tuning.slow_duration_ms,
    }
    log::debug!("{:?} activated at {:.0}ms", kind, state.elapsed_ms);
    state.events.push(GameEvent::BoostActivated { kind });
}

fn game_over(state: &mut GameState) {
    state.player.die();
    state.effects = Default::default();
    state.set_phase(RunPhase::GameOver);
    log::info!(
        "Game over: score={} crystals={} distance={:.2} time={:.0}ms",
        state.board.score,
        state.board.crystals,
        state.board.distance,
        state.elapsed_ms
    );
    state.events.push(GameEvent::GameOver {
        score: state.board.score,
        crystals: state.board.crystals,
    });
}

/// Demo-mode input. Dodges by lane change when a neighbour lane is clear,
/// otherwise by jump or slide; heads for crystals when nothing threatens.
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    let player = &state.player;
    if player.is_transitioning() || player.is_dead() {
        return input;
    }
    let p = state.tuning.player_depth;
    let r = state.tuning.collision_range;
    let lookahead = 0.3;

    let threat_in = |lane: u8| {
        state
            .registry
            .obstacles
            .iter()
            .filter(|o| !o.struck && o.lane == lane)
            .filter(|o| o.depth > p - lookahead && o.depth <= p + r)
            .max_by(|a, b| a.depth.total_cmp(&b.depth))
    };

    let neighbours = [player.lane.checked_sub(1), Some(player.lane + 1)];
    let safe_neighbour = neighbours
        .into_iter()
        .flatten()
        .filter(|&lane| lane < LANE_COUNT)
        .find(|&lane| threat_in(lane).is_none());

    if let Some(threat) = threat_in(player.lane) {
        if let Some(lane) = safe_neighbour {
            input.move_left = lane < player.lane;
            input.move_right = lane > player.lane;
        } else if threat.depth >= p - r - 0.02 {
            match threat.kind.avoidance() {
                Avoidance::Jump => input.jump = true,
                Avoidance::Slide => input.slide = true,
            }
        }
        return input;
    }

    // Head for the nearest crystal that is still ahead
    let target = state
        .registry
        .active_crystals()
        .filter(|c| c.depth < p - r)
        .max_by(|a, b| a.depth.total_cmp(&b.depth))
        .map(|c| c.lane.round() as u8);
    if let Some(lane) = target {
        if lane < player.lane && threat_in(player.lane - 1).is_none() {
            input.move_left = true;
        } else if lane > player.lane && threat_in(player.lane + 1).is_none() {
            input.move_right = true;
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FRAME_DT_MS, PLAYER_DEPTH};

    fn press(f: impl FnOnce(&mut TickInput)) -> TickInput {
        let mut input = TickInput::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_ready_to_running_after_grace() {
        let mut state = GameState::new(12345);
        let idle = TickInput::default();
        for _ in 0..200 {
            tick(&mut state, &idle, 17.0);
        }
        assert_eq!(state.phase, RunPhase::Ready);
        for _ in 0..10 {
            tick(&mut state, &idle, 17.0);
        }
        assert_eq!(state.phase, RunPhase::Running);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);
        tick(&mut state, &TickInput::default(), FRAME_DT_MS);
        let elapsed = state.elapsed_ms;
        let snapshot = state.registry.crystals.len();

        let pause = press(|i| i.toggle_pause = true);
        tick(&mut state, &pause, FRAME_DT_MS);
        assert_eq!(state.phase, RunPhase::Paused);

        // Frozen: time, input and entities all hold
        for _ in 0..100 {
            tick(&mut state, &press(|i| i.jump = true), FRAME_DT_MS);
        }
        assert_eq!(state.elapsed_ms, elapsed);
        assert_eq!(state.registry.crystals.len(), snapshot);
        assert!(!state.player.is_jumping());

        // Unpause resumes from where it stopped
        tick(&mut state, &pause, FRAME_DT_MS);
        assert_eq!(state.phase, RunPhase::Ready);
        assert!((state.elapsed_ms - (elapsed + FRAME_DT_MS)).abs() < 1e-3);
    }

    #[test]
    fn test_jump_emits_event_and_telemetry_once() {
        let mut state = GameState::new(1);
        tick(&mut state, &press(|i| i.jump = true), FRAME_DT_MS);
        assert!(state.events.contains(&GameEvent::Jumped));
        // Already airborne
        tick(&mut state, &press(|i| i.jump = true), FRAME_DT_MS);
        assert!(!state.events.contains(&GameEvent::Jumped));
        assert_eq!(state.telemetry.count(TelemetryKind::Jump), 1);
    }

    #[test]
    fn test_shield_block_keeps_hp_and_streak() {
        let mut state = GameState::new(1);
        state.player.raise_shield(1);
        state.board.collect_crystal(&state.tuning);
        state
            .registry
            .spawn_obstacle(ObstacleKind::IceSpike, 1, PLAYER_DEPTH);
        tick(&mut state, &TickInput::default(), 0.0);

        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::ShieldBlocked {
                charges_left: 0,
                ..
            }
        )));
        assert_eq!(state.board.hit_points, 3);
        assert_eq!(state.board.combo.streak, 1);
        assert!(!state.player.shield_active());
    }

    #[test]
    fn test_unshielded_hit_costs_hp_and_streak() {
        let mut state = GameState::new(1);
        for _ in 0..3 {
            state.board.collect_crystal(&state.tuning);
        }
        state
            .registry
            .spawn_obstacle(ObstacleKind::FallingIcicle, 1, PLAYER_DEPTH);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.board.hit_points, 2);
        assert_eq!(state.board.combo.streak, 0);
        assert_eq!(state.telemetry.count(TelemetryKind::Hit), 1);
    }

    #[test]
    fn test_same_frame_hits_stop_at_game_over() {
        let mut state = GameState::new(1);
        for _ in 0..4 {
            state
                .registry
                .spawn_obstacle(ObstacleKind::IcePit, 1, PLAYER_DEPTH);
        }
        tick(&mut state, &TickInput::default(), 0.0);
        assert!(state.is_over());
        assert_eq!(state.board.hit_points, 0);
        let overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(state.telemetry.count(TelemetryKind::Hit), 3);
    }

    #[test]
    fn test_boost_refreshes_duration() {
        let mut state = GameState::new(1);
        state.registry.spawn_boost(BoostKind::SlowTime, 1, PLAYER_DEPTH);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.effects.slow_ms, 3000.0);

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), 20.0);
        }
        assert!((state.effects.slow_ms - 1800.0).abs() < 1e-2);
        state.registry.spawn_boost(BoostKind::SlowTime, 1, PLAYER_DEPTH);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.effects.slow_ms, 3000.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        let demo = press(|i| i.idle_mode = true);

        for _ in 0..3000 {
            tick(&mut state1, &demo, FRAME_DT_MS);
            tick(&mut state2, &demo, FRAME_DT_MS);
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.board.score, state2.board.score);
        assert_eq!(state1.registry.len(), state2.registry.len());
        assert_eq!(state1.telemetry, state2.telemetry);
        assert_eq!(
            serde_json::to_string(&state1).ok(),
            serde_json::to_string(&state2).ok()
        );
    }
}
