//! Player vs entity interaction resolver
//!
//! Runs once per frame after entities have moved. The resolver only marks
//! entities (passed, struck, consumed) and reports what happened; the tick
//! driver turns the report into damage, score and effects.

use super::entities::{Avoidance, BoostKind, EntityRegistry, ObstacleKind};
use super::player::Player;
use crate::tuning::Tuning;

/// One player/entity contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Obstacle met the player in the wrong pose
    Strike { obstacle: u32, kind: ObstacleKind },
    /// Obstacle slipped behind the player in the player's lane
    NearMiss { obstacle: u32, kind: ObstacleKind },
    CrystalPickup { crystal: u32 },
    BoostPickup { boost: u32, kind: BoostKind },
}

/// Depth window around the player plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactWindow {
    pub player_depth: f32,
    pub range: f32,
    pub crystal_range: f32,
    pub boost_range: f32,
}

impl From<&Tuning> for ContactWindow {
    fn from(tuning: &Tuning) -> Self {
        Self {
            player_depth: tuning.player_depth,
            range: tuning.collision_range,
            crystal_range: tuning.collision_range + tuning.crystal_pickup_slack,
            boost_range: tuning.collision_range + tuning.boost_pickup_slack,
        }
    }
}

/// Whether the current pose clears an obstacle of this kind
pub fn pose_avoids(player: &Player, kind: ObstacleKind) -> bool {
    match kind.avoidance() {
        Avoidance::Jump => player.is_jumping(),
        Avoidance::Slide => player.is_sliding(),
    }
}

/// Crystal lane test; the magnet widens it to the neighbouring lanes
fn crystal_in_reach(crystal_lane: f32, player_lane: u8, magnet_on: bool) -> bool {
    let gap = (crystal_lane - player_lane as f32).abs();
    gap < 0.5 || (magnet_on && gap <= 1.0)
}

/// Evaluate every live entity against the player, in spawn order:
/// obstacles, then crystals, then boosts.
pub fn resolve(
    player: &Player,
    magnet_on: bool,
    registry: &mut EntityRegistry,
    window: ContactWindow,
) -> Vec<Interaction> {
    let mut found = Vec::new();
    if player.is_dead() {
        return found;
    }
    let lane = player.lane;
    let p = window.player_depth;

    for obstacle in &mut registry.obstacles {
        if obstacle.struck {
            continue;
        }
        if (obstacle.depth - p).abs() > window.range {
            if !obstacle.passed && obstacle.depth > p + window.range {
                obstacle.passed = true;
                if obstacle.lane == lane {
                    found.push(Interaction::NearMiss {
                        obstacle: obstacle.id,
                        kind: obstacle.kind,
                    });
                }
            }
            continue;
        }
        if obstacle.lane != lane || pose_avoids(player, obstacle.kind) {
            continue;
        }
        obstacle.struck = true;
        found.push(Interaction::Strike {
            obstacle: obstacle.id,
            kind: obstacle.kind,
        });
    }

    for crystal in registry.crystals.iter_mut().filter(|c| c.active) {
        if (crystal.depth - p).abs() > window.crystal_range {
            continue;
        }
        if !crystal_in_reach(crystal.lane, lane, magnet_on) {
            continue;
        }
        crystal.active = false;
        found.push(Interaction::CrystalPickup { crystal: crystal.id });
    }

    for boost in registry.boosts.iter_mut().filter(|b| b.active) {
        if (boost.depth - p).abs() > window.boost_range || boost.lane != lane {
            continue;
        }
        boost.active = false;
        found.push(Interaction::BoostPickup {
            boost: boost.id,
            kind: boost.kind,
        });
    }

    found
}
