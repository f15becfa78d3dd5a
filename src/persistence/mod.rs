//! Profile persistence over an injected key-value store
//!
//! The simulation reads the profile once when a run starts and writes it once
//! when the run ends. Values are stored as decimal strings under flat keys so
//! any string store (browser storage, a file, a test map) can back it.

pub mod store;
pub mod upgrades;

pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use upgrades::{PurchaseError, UpgradeKind, purchase};

use serde::{Deserialize, Serialize};

use crate::sim::{RunSummary, UpgradeLevels};

/// Best score ever recorded
pub const BEST_SCORE_KEY: &str = "frost_rush_best";
/// Spendable crystal balance
pub const CRYSTAL_BANK_KEY: &str = "frost_rush_crystals";

/// Read a non-negative integer; missing, malformed or negative values read as 0
pub fn read_count(store: &dyn KeyValueStore, key: &str) -> u64 {
    let Some(raw) = store.get(key) else {
        return 0;
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => value as u64,
        Ok(_) | Err(_) => {
            log::warn!("Ignoring stored value {:?} for {}", raw, key);
            0
        }
    }
}

pub fn write_count(store: &mut dyn KeyValueStore, key: &str, value: u64) {
    store.set(key, &value.to_string());
}

/// Persistent player profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub best_score: u64,
    pub crystal_bank: u64,
    pub upgrades: UpgradeLevels,
}

impl Profile {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let level = |kind: UpgradeKind| kind.level(store);
        let profile = Self {
            best_score: read_count(store, BEST_SCORE_KEY),
            crystal_bank: read_count(store, CRYSTAL_BANK_KEY),
            upgrades: UpgradeLevels {
                crystal_bonus: level(UpgradeKind::CrystalBonus),
                shield: level(UpgradeKind::ShieldDuration),
                start_speed: level(UpgradeKind::StartSpeed),
                magnet_radius: level(UpgradeKind::MagnetRadius),
            },
        };
        log::info!(
            "Loaded profile: best={} bank={} upgrades={:?}",
            profile.best_score,
            profile.crystal_bank,
            profile.upgrades
        );
        profile
    }
}

/// What finishing a run changed in the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub new_best: bool,
    pub best_score: u64,
    pub crystal_bank: u64,
}

/// Bank the run's crystals and keep the best score
pub fn record_run(store: &mut dyn KeyValueStore, summary: &RunSummary) -> RunRecord {
    let previous_best = read_count(store, BEST_SCORE_KEY);
    let new_best = summary.score > previous_best;
    if new_best {
        write_count(store, BEST_SCORE_KEY, summary.score);
        log::info!("New best score {} (was {})", summary.score, previous_best);
    }

    let crystal_bank = read_count(store, CRYSTAL_BANK_KEY) + summary.crystals as u64;
    write_count(store, CRYSTAL_BANK_KEY, crystal_bank);

    RunRecord {
        new_best,
        best_score: previous_best.max(summary.score),
        crystal_bank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: u64, crystals: u32) -> RunSummary {
        RunSummary {
            seed: 1,
            score,
            crystals,
            near_misses: 0,
            distance: 0.0,
            duration_ms: 1000.0,
            best_streak: 0,
            frames: 60,
        }
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = MemoryStore::default();
        assert_eq!(Profile::load(&store), Profile::default());
    }

    #[test]
    fn test_malformed_values_read_as_zero() {
        let mut store = MemoryStore::default();
        store.set(BEST_SCORE_KEY, "lots");
        store.set(CRYSTAL_BANK_KEY, "-40");
        store.set(&UpgradeKind::StartSpeed.storage_key(), "2");
        store.set(&UpgradeKind::CrystalBonus.storage_key(), "1.5");

        let profile = Profile::load(&store);
        assert_eq!(profile.best_score, 0);
        assert_eq!(profile.crystal_bank, 0);
        assert_eq!(profile.upgrades.start_speed, 2);
        assert_eq!(profile.upgrades.crystal_bonus, 0);
    }

    #[test]
    fn test_levels_clamped_to_max() {
        let mut store = MemoryStore::default();
        store.set(&UpgradeKind::ShieldDuration.storage_key(), "99");
        assert_eq!(Profile::load(&store).upgrades.shield, 3);
    }

    #[test]
    fn test_record_run_best_and_bank() {
        let mut store = MemoryStore::default();
        let first = record_run(&mut store, &summary(500, 7));
        assert!(first.new_best);
        assert_eq!(first.crystal_bank, 7);

        let second = record_run(&mut store, &summary(300, 5));
        assert!(!second.new_best);
        assert_eq!(second.best_score, 500);
        assert_eq!(second.crystal_bank, 12);

        // A tie is not a new best
        assert!(!record_run(&mut store, &summary(500, 0)).new_best);

        let profile = Profile::load(&store);
        assert_eq!(profile.best_score, 500);
        assert_eq!(profile.crystal_bank, 12);
    }
}
