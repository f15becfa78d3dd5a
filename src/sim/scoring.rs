//! Score, combo streak and hit points
//!
//! The combo multiplier is a pure function of the pickup streak (crystals and
//! near-misses) read from an ordered threshold table. A hit clears the streak
//! but never takes back score or crystals.

use serde::{Deserialize, Serialize};

use crate::tuning::{ComboStep, Tuning};

/// Index and multiplier of the highest table row whose breakpoint is `<= streak`
pub fn combo_for_streak(table: &[ComboStep], streak: u32) -> (usize, u32) {
    table
        .iter()
        .enumerate()
        .rev()
        .find(|(_, step)| streak >= step.streak)
        .map(|(level, step)| (level, step.multiplier))
        .unwrap_or((0, 1))
}

/// Consecutive pickups since the last hit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Combo {
    pub streak: u32,
    pub level: usize,
    pub multiplier: u32,
    /// Longest streak this run
    pub best_streak: u32,
}

impl Combo {
    pub fn new(table: &[ComboStep]) -> Self {
        let (level, multiplier) = combo_for_streak(table, 0);
        Self {
            streak: 0,
            level,
            multiplier,
            best_streak: 0,
        }
    }

    /// Count one pickup; returns true when this raised the combo level
    pub fn bump(&mut self, table: &[ComboStep]) -> bool {
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        let (level, multiplier) = combo_for_streak(table, self.streak);
        let raised = level > self.level;
        self.level = level;
        self.multiplier = multiplier;
        raised
    }

    pub fn reset(&mut self, table: &[ComboStep]) {
        self.streak = 0;
        let (level, multiplier) = combo_for_streak(table, 0);
        self.level = level;
        self.multiplier = multiplier;
    }
}

/// Points awarded by a single pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub points: u64,
    /// The pickup pushed the combo to a new level
    pub combo_up: bool,
}

/// Result of an unshielded hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    Survived { hit_points: u8 },
    Fatal,
}

/// Run accumulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u64,
    pub crystals: u32,
    pub near_misses: u32,
    /// Total depth traveled
    pub distance: f32,
    /// Depth not yet converted into distance points
    pub distance_carry: f32,
    pub hit_points: u8,
    pub combo: Combo,
    /// Value of one crystal before the multiplier (includes upgrade bonus)
    pub crystal_value: u64,
}

impl Scoreboard {
    pub fn new(tuning: &Tuning, crystal_bonus_level: u32) -> Self {
        let bonus = 1.0 + crystal_bonus_level as f64 * tuning.crystal_bonus_per_level as f64;
        Self {
            score: 0,
            crystals: 0,
            near_misses: 0,
            distance: 0.0,
            distance_carry: 0.0,
            hit_points: tuning.starting_hit_points,
            combo: Combo::new(&tuning.combo_table),
            crystal_value: (tuning.crystal_score as f64 * bonus).floor() as u64,
        }
    }

    pub fn multiplier(&self) -> u64 {
        self.combo.multiplier as u64
    }

    /// Credit traveled depth; returns points earned (several quanta may be
    /// crossed in one call)
    pub fn add_distance(&mut self, dz: f32, tuning: &Tuning) -> u64 {
        self.distance += dz;
        self.distance_carry += dz;
        let mut earned = 0;
        while self.distance_carry >= tuning.distance_quantum {
            self.distance_carry -= tuning.distance_quantum;
            earned += tuning.distance_points as u64 * self.multiplier();
        }
        self.score += earned;
        earned
    }

    /// A crystal was collected; the streak grows before the multiplier is read
    pub fn collect_crystal(&mut self, tuning: &Tuning) -> Award {
        self.crystals += 1;
        let combo_up = self.combo.bump(&tuning.combo_table);
        let points = self.crystal_value * self.multiplier();
        self.score += points;
        Award { points, combo_up }
    }

    /// An obstacle slipped past in the player's lane
    pub fn near_miss(&mut self, tuning: &Tuning) -> Award {
        self.near_misses += 1;
        let combo_up = self.combo.bump(&tuning.combo_table);
        let points = tuning.near_miss_points as u64 * self.multiplier();
        self.score += points;
        Award { points, combo_up }
    }

    /// Unshielded hit: lose a hit point and the streak
    pub fn take_hit(&mut self, tuning: &Tuning) -> Damage {
        self.combo.reset(&tuning.combo_table);
        self.hit_points = self.hit_points.saturating_sub(1);
        if self.hit_points == 0 {
            Damage::Fatal
        } else {
            Damage::Survived {
                hit_points: self.hit_points,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_multiplier_table() {
        let table = Tuning::default().combo_table;
        assert_eq!(combo_for_streak(&table, 0), (0, 1));
        assert_eq!(combo_for_streak(&table, 4), (0, 1));
        assert_eq!(combo_for_streak(&table, 5), (1, 2));
        assert_eq!(combo_for_streak(&table, 15), (2, 3));
        assert_eq!(combo_for_streak(&table, 29), (2, 3));
        assert_eq!(combo_for_streak(&table, 30), (3, 5));
        assert_eq!(combo_for_streak(&table, 1000), (3, 5));
    }

    #[test]
    fn test_distance_quanta() {
        let tuning = Tuning::default();
        let mut board = Scoreboard::new(&tuning, 0);
        for _ in 0..7 {
            board.add_distance(tuning.distance_quantum, &tuning);
        }
        assert_eq!(board.score, 70);

        // Several quanta in one frame
        let mut board = Scoreboard::new(&tuning, 0);
        assert_eq!(board.add_distance(0.35, &tuning), 30);
        assert!(board.distance_carry < tuning.distance_quantum);
    }

    #[test]
    fn test_crystal_value_and_bonus() {
        let tuning = Tuning::default();
        let mut board = Scoreboard::new(&tuning, 0);
        assert_eq!(board.collect_crystal(&tuning).points, 50);

        let mut board = Scoreboard::new(&tuning, 3);
        assert_eq!(board.crystal_value, 65);
        assert_eq!(board.collect_crystal(&tuning).points, 65);
        assert_eq!(board.crystals, 1);
    }

    #[test]
    fn test_fifth_pickup_earns_double() {
        let tuning = Tuning::default();
        let mut board = Scoreboard::new(&tuning, 0);
        for _ in 0..4 {
            assert!(!board.collect_crystal(&tuning).combo_up);
        }
        let award = board.collect_crystal(&tuning);
        assert!(award.combo_up);
        assert_eq!(award.points, 100);
        assert_eq!(board.near_miss(&tuning).points, 50);
        assert_eq!(board.combo.streak, 6);
    }

    #[test]
    fn test_hit_resets_streak_not_score() {
        let tuning = Tuning::default();
        let mut board = Scoreboard::new(&tuning, 0);
        for _ in 0..6 {
            board.collect_crystal(&tuning);
        }
        let score = board.score;
        assert_eq!(board.take_hit(&tuning), Damage::Survived { hit_points: 2 });
        assert_eq!(board.combo.streak, 0);
        assert_eq!(board.multiplier(), 1);
        assert_eq!(board.combo.best_streak, 6);
        assert_eq!(board.score, score);
        assert_eq!(board.crystals, 6);
    }

    #[test]
    fn test_third_hit_is_fatal() {
        let tuning = Tuning::default();
        let mut board = Scoreboard::new(&tuning, 0);
        board.take_hit(&tuning);
        board.take_hit(&tuning);
        assert_eq!(board.take_hit(&tuning), Damage::Fatal);
        assert_eq!(board.hit_points, 0);
        // Saturates
        assert_eq!(board.take_hit(&tuning), Damage::Fatal);
        assert_eq!(board.hit_points, 0);
    }

    proptest! {
        #[test]
        fn prop_multiplier_is_greatest_reached_row(streak in 0u32..200) {
            let table = Tuning::default().combo_table;
            let expected = table
                .iter()
                .filter(|s| s.streak <= streak)
                .map(|s| s.multiplier)
                .max()
                .unwrap_or(1);
            prop_assert_eq!(combo_for_streak(&table, streak).1, expected);
        }

        #[test]
        fn prop_level_never_drops_while_streak_grows(bumps in 0usize..80) {
            let table = Tuning::default().combo_table;
            let mut combo = Combo::new(&table);
            let mut last = combo.level;
            for _ in 0..bumps {
                combo.bump(&table);
                prop_assert!(combo.level >= last);
                last = combo.level;
            }
        }
    }
}
