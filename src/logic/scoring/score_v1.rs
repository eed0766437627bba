//! Stable (ScoreV1) scoring: combo-multiplied hit values.

use crate::logic::results::{ComboResult, HitResult};
use crate::logic::scoring::{step_combo, ScoreProcessor};
use crate::models::beatmap::Beatmap;
use crate::models::difficulty::Difficulty;

pub struct ScoreV1Processor {
    score: i64,
    combo: u32,
    difficulty_multiplier: f64,
    mod_multiplier: f64,
}

impl ScoreV1Processor {
    pub fn new() -> Self {
        Self {
            score: 0,
            combo: 0,
            difficulty_multiplier: 1.0,
            mod_multiplier: 1.0,
        }
    }
}

impl Default for ScoreV1Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreProcessor for ScoreV1Processor {
    fn init(&mut self, beatmap: &Beatmap, diff: &Difficulty) {
        self.difficulty_multiplier = ((beatmap.hp + beatmap.cs + beatmap.od) / 38.0 * 5.0).round();
        self.mod_multiplier = diff.mods.score_multiplier();
    }

    fn add_result(&mut self, result: HitResult, combo: ComboResult) {
        step_combo(&mut self.combo, combo);

        let value = result.score_value();
        if result.is_base() && result != HitResult::Miss {
            let combo_bonus = (value as f64
                * f64::from(self.combo.saturating_sub(1))
                * self.difficulty_multiplier
                * self.mod_multiplier
                / 25.0) as i64;
            self.score += value + combo_bonus;
        } else {
            // Slider parts and spinner points pay flat.
            self.score += value;
        }
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn combo(&self) -> u32 {
        self.combo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::beatmap::Beatmap;
    use crate::models::mods::Mods;

    fn processor() -> ScoreV1Processor {
        let map = Beatmap::new(Vec::new(), 5.0, 4.0, 7.0, 9.0);
        let diff = Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::NONE);
        let mut sc = ScoreV1Processor::new();
        sc.init(&map, &diff);
        sc
    }

    #[test]
    fn test_combo_scales_score() {
        let mut sc = processor();
        sc.add_result(HitResult::Hit300, ComboResult::Increase);
        let first = sc.score();
        sc.add_result(HitResult::Hit300, ComboResult::Increase);
        let second = sc.score() - first;
        // Same hit value, higher combo, more points.
        assert!(second > first);
    }

    #[test]
    fn test_miss_resets_combo_and_adds_nothing() {
        let mut sc = processor();
        sc.add_result(HitResult::Hit300, ComboResult::Increase);
        sc.add_result(HitResult::Hit300, ComboResult::Increase);
        let before = sc.score();

        sc.add_result(HitResult::Miss, ComboResult::Reset);
        assert_eq!(sc.score(), before);
        assert_eq!(sc.combo(), 0);
    }

    #[test]
    fn test_slider_parts_pay_flat() {
        let mut sc = processor();
        sc.add_result(HitResult::SliderStart, ComboResult::Increase);
        sc.add_result(HitResult::SliderPoint, ComboResult::Increase);
        assert_eq!(sc.score(), 40);
        assert_eq!(sc.combo(), 2);
    }
}
