//! Upgrade shop rules: level caps, cost tables, crystal bank debit

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::KeyValueStore;
use super::{CRYSTAL_BANK_KEY, read_count, write_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    MagnetRadius,
    ShieldDuration,
    StartSpeed,
    CrystalBonus,
}

impl UpgradeKind {
    /// Shop order
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::MagnetRadius,
        UpgradeKind::ShieldDuration,
        UpgradeKind::StartSpeed,
        UpgradeKind::CrystalBonus,
    ];

    pub fn key(self) -> &'static str {
        match self {
            UpgradeKind::MagnetRadius => "magnet_radius",
            UpgradeKind::ShieldDuration => "shield_duration",
            UpgradeKind::StartSpeed => "start_speed",
            UpgradeKind::CrystalBonus => "crystal_bonus",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::MagnetRadius => "Magnet Radius",
            UpgradeKind::ShieldDuration => "Shield Strength",
            UpgradeKind::StartSpeed => "Head Start",
            UpgradeKind::CrystalBonus => "Crystal Bonus",
        }
    }

    /// Crystal price of each level, index = current level
    pub fn costs(self) -> &'static [u64] {
        match self {
            UpgradeKind::MagnetRadius | UpgradeKind::CrystalBonus => &[15, 40, 80, 160, 320],
            UpgradeKind::ShieldDuration => &[25, 60, 120],
            UpgradeKind::StartSpeed => &[20, 50, 100],
        }
    }

    pub fn max_level(self) -> u32 {
        self.costs().len() as u32
    }

    /// Price of the next level, `None` once maxed
    pub fn next_cost(self, level: u32) -> Option<u64> {
        self.costs().get(level as usize).copied()
    }

    pub fn storage_key(self) -> String {
        format!("frost_upgrade_{}", self.key())
    }

    /// Stored level, clamped to the cap
    pub fn level(self, store: &dyn KeyValueStore) -> u32 {
        let stored = read_count(store, &self.storage_key());
        stored.min(self.max_level() as u64) as u32
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("{} is already at max level {level}", .kind.name())]
    MaxLevel { kind: UpgradeKind, level: u32 },

    #[error("{cost} crystals needed, {available} available")]
    InsufficientCrystals { cost: u64, available: u64 },
}

/// Buy the next level of `kind`; returns the new level
pub fn purchase(store: &mut dyn KeyValueStore, kind: UpgradeKind) -> Result<u32, PurchaseError> {
    let level = kind.level(store);
    let cost = kind
        .next_cost(level)
        .ok_or(PurchaseError::MaxLevel { kind, level })?;
    let available = read_count(store, CRYSTAL_BANK_KEY);
    if available < cost {
        return Err(PurchaseError::InsufficientCrystals { cost, available });
    }

    write_count(store, CRYSTAL_BANK_KEY, available - cost);
    write_count(store, &kind.storage_key(), level as u64 + 1);
    log::info!("Bought {} level {} for {} crystals", kind.key(), level + 1, cost);
    Ok(level + 1)
}
