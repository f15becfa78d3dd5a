//! Entity registry: obstacles, crystals and boosts riding the track
//!
//! Entities are stored in id order (spawn order). Removal is mark-then-compact
//! via `retain`, so a sweep never skips or double-visits an entity.

use serde::{Deserialize, Serialize};

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    IceSpike,
    BrokenBridge,
    FallingIcicle,
    SlidingBlock,
    IcePit,
}

/// How an obstacle is dodged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avoidance {
    Jump,
    Slide,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::IceSpike,
        ObstacleKind::BrokenBridge,
        ObstacleKind::FallingIcicle,
        ObstacleKind::SlidingBlock,
        ObstacleKind::IcePit,
    ];

    /// Fixed jump/slide partition
    pub fn avoidance(self) -> Avoidance {
        match self {
            ObstacleKind::IceSpike
            | ObstacleKind::BrokenBridge
            | ObstacleKind::SlidingBlock
            | ObstacleKind::IcePit => Avoidance::Jump,
            ObstacleKind::FallingIcicle => Avoidance::Slide,
        }
    }

    /// Prompt shown above the obstacle
    pub fn hint(self) -> &'static str {
        match self.avoidance() {
            Avoidance::Jump => "JUMP",
            Avoidance::Slide => "SLIDE",
        }
    }
}

/// Boost variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoostKind {
    Shield,
    Magnet,
    SlowTime,
}

impl BoostKind {
    pub const ALL: [BoostKind; 3] = [BoostKind::Shield, BoostKind::Magnet, BoostKind::SlowTime];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub lane: u8,
    pub depth: f32,
    /// Set once the obstacle is behind the player's contact window
    pub passed: bool,
    /// Set once the obstacle has hit (or been blocked by) the player
    pub struck: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    pub id: u32,
    /// Fractional while a magnet pulls it across
    pub lane: f32,
    pub depth: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boost {
    pub id: u32,
    pub kind: BoostKind,
    pub lane: u8,
    pub depth: f32,
    pub active: bool,
}

/// Parameters for one frame of magnet attraction
#[derive(Debug, Clone, Copy)]
pub struct MagnetPull {
    pub target_lane: f32,
    pub target_depth: f32,
    /// Depth distance inside which crystals are pulled
    pub range: f32,
    /// Fraction of the lane gap closed this frame
    pub lane_step: f32,
    /// Fraction of the depth gap closed this frame
    pub depth_step: f32,
    pub snap: f32,
}

/// Owns every live entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    pub obstacles: Vec<Obstacle>,
    pub crystals: Vec<Crystal>,
    pub boosts: Vec<Boost>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, lane: u8, depth: f32) -> u32 {
        let id = self.allocate_id();
        self.obstacles.push(Obstacle {
            id,
            kind,
            lane,
            depth,
            passed: false,
            struck: false,
        });
        id
    }

    pub fn spawn_crystal(&mut self, lane: u8, depth: f32) -> u32 {
        let id = self.allocate_id();
        self.crystals.push(Crystal {
            id,
            lane: lane as f32,
            depth,
            active: true,
        });
        id
    }

    pub fn spawn_boost(&mut self, kind: BoostKind, lane: u8, depth: f32) -> u32 {
        let id = self.allocate_id();
        self.boosts.push(Boost {
            id,
            kind,
            lane,
            depth,
            active: true,
        });
        id
    }

    /// Drop consumed pickups, move everything `dz` toward the camera and
    /// prune what has fallen past `despawn_depth`. Returns how many
    /// entities were removed.
    pub fn advance(&mut self, dz: f32, despawn_depth: f32) -> usize {
        let before = self.len();

        self.crystals.retain(|c| c.active);
        self.boosts.retain(|b| b.active);

        for obstacle in &mut self.obstacles {
            obstacle.depth += dz;
        }
        for crystal in &mut self.crystals {
            crystal.depth += dz;
        }
        for boost in &mut self.boosts {
            boost.depth += dz;
        }

        self.obstacles.retain(|o| o.depth <= despawn_depth);
        self.crystals.retain(|c| c.depth <= despawn_depth);
        self.boosts.retain(|b| b.depth <= despawn_depth);

        let removed = before - self.len();
        if removed > 0 {
            log::trace!("Swept {} entities", removed);
        }
        removed
    }

    /// Ease live crystals near the player toward the player's lane and depth.
    /// Depth only ever moves forward.
    pub fn attract_crystals(&mut self, pull: MagnetPull) {
        for crystal in self.crystals.iter_mut().filter(|c| c.active) {
            if (crystal.depth - pull.target_depth).abs() >= pull.range {
                continue;
            }
            crystal.lane += (pull.target_lane - crystal.lane) * pull.lane_step;
            if (pull.target_lane - crystal.lane).abs() < pull.snap {
                crystal.lane = pull.target_lane;
            }
            let forward = (pull.target_depth - crystal.depth) * pull.depth_step;
            if forward > 0.0 {
                crystal.depth += forward;
            }
        }
    }

    /// Put every crystal back on a whole lane
    pub fn snap_crystal_lanes(&mut self) {
        for crystal in &mut self.crystals {
            crystal.lane = crystal.lane.round();
        }
    }

    pub fn active_crystals(&self) -> impl Iterator<Item = &Crystal> {
        self.crystals.iter().filter(|c| c.active)
    }

    pub fn active_boosts(&self) -> impl Iterator<Item = &Boost> {
        self.boosts.iter().filter(|b| b.active)
    }

    /// Entity count, consumed-but-unswept pickups included
    pub fn len(&self) -> usize {
        self.obstacles.len() + self.crystals.len() + self.boosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.crystals.clear();
        self.boosts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avoidance_table() {
        let jump: Vec<_> = ObstacleKind::ALL
            .iter()
            .filter(|k| k.avoidance() == Avoidance::Jump)
            .collect();
        assert_eq!(jump.len(), 4);
        assert_eq!(ObstacleKind::FallingIcicle.avoidance(), Avoidance::Slide);
        assert_eq!(ObstacleKind::IcePit.hint(), "JUMP");
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut registry = EntityRegistry::new();
        let a = registry.spawn_obstacle(ObstacleKind::IceSpike, 0, 0.0);
        let b = registry.spawn_crystal(1, 0.0);
        let c = registry.spawn_boost(BoostKind::Magnet, 2, 0.0);
        assert!(a < b && b < c);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_advance_moves_and_despawns() {
        let mut registry = EntityRegistry::new();
        registry.spawn_obstacle(ObstacleKind::IcePit, 1, 1.1);
        registry.spawn_obstacle(ObstacleKind::IcePit, 1, 0.5);
        registry.spawn_crystal(0, -0.05);

        let removed = registry.advance(0.1, 1.15);
        assert_eq!(removed, 1);
        assert_eq!(registry.obstacles.len(), 1);
        assert!((registry.obstacles[0].depth - 0.6).abs() < 1e-6);
        assert!((registry.crystals[0].depth - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_consumed_pickups_removed_on_next_sweep() {
        let mut registry = EntityRegistry::new();
        registry.spawn_crystal(0, 0.5);
        registry.spawn_crystal(0, 0.45);
        registry.spawn_boost(BoostKind::Shield, 1, 0.5);
        registry.crystals[0].active = false;
        registry.boosts[0].active = false;

        // Still stored until the sweep
        assert_eq!(registry.active_crystals().count(), 1);
        assert_eq!(registry.len(), 3);

        assert_eq!(registry.advance(0.0, 1.15), 2);
        assert_eq!(registry.crystals.len(), 1);
        assert!(registry.boosts.is_empty());
    }

    #[test]
    fn test_consecutive_removals_are_not_skipped() {
        let mut registry = EntityRegistry::new();
        for _ in 0..5 {
            registry.spawn_obstacle(ObstacleKind::IceSpike, 1, 1.14);
        }
        registry.spawn_obstacle(ObstacleKind::IceSpike, 1, 0.2);
        assert_eq!(registry.advance(0.02, 1.15), 5);
        assert_eq!(registry.obstacles.len(), 1);
    }

    #[test]
    fn test_magnet_pull_never_moves_backward() {
        let mut registry = EntityRegistry::new();
        registry.spawn_crystal(0, 0.7);
        registry.spawn_crystal(2, 0.9);
        let pull = MagnetPull {
            target_lane: 1.0,
            target_depth: 0.82,
            range: 0.3,
            lane_step: 0.5,
            depth_step: 0.5,
            snap: 0.05,
        };
        registry.attract_crystals(pull);
        assert!((registry.crystals[0].lane - 0.5).abs() < 1e-6);
        assert!((registry.crystals[0].depth - 0.76).abs() < 1e-6);
        // Past the player: lane eases, depth holds
        assert!((registry.crystals[1].lane - 1.5).abs() < 1e-6);
        assert!((registry.crystals[1].depth - 0.9).abs() < 1e-6);

        registry.snap_crystal_lanes();
        assert_eq!(registry.crystals[0].lane, 1.0);
        assert_eq!(registry.crystals[1].lane, 2.0);
    }
}
