//! ScoreV2: capped total split into combo and accuracy portions.

use crate::logic::results::{ComboResult, HitResult, JudgementResult};
use crate::logic::scoring::{step_combo, ScoreProcessor};
use crate::models::beatmap::{Beatmap, HitObjectData};
use crate::models::difficulty::Difficulty;

const COMBO_PORTION: f64 = 700_000.0;
const ACC_PORTION: f64 = 300_000.0;

pub struct ScoreV2Processor {
    combo: u32,
    combo_part: f64,
    combo_part_max: f64,
    bonus: f64,

    raw_acc_score: i64,
    judged: u32,
    total_objects: u32,

    mod_multiplier: f64,
}

impl ScoreV2Processor {
    pub fn new() -> Self {
        Self {
            combo: 0,
            combo_part: 0.0,
            combo_part_max: 0.0,
            bonus: 0.0,
            raw_acc_score: 0,
            judged: 0,
            total_objects: 0,
            mod_multiplier: 1.0,
        }
    }

    fn combo_value(combo: u32, value: i64) -> f64 {
        value as f64 * (1.0 + f64::from(combo) / 10.0)
    }

    fn accuracy(&self) -> f64 {
        if self.judged == 0 {
            return 1.0;
        }
        self.raw_acc_score as f64 / f64::from(300 * self.judged)
    }
}

impl Default for ScoreV2Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreProcessor for ScoreV2Processor {
    fn init(&mut self, beatmap: &Beatmap, diff: &Difficulty) {
        self.mod_multiplier = diff.mods.score_multiplier();
        self.total_objects = beatmap.objects.len() as u32;

        // Replay a flawless run to size the combo portion.
        let mut combo = 0u32;
        let mut max_part = 0.0;

        let mut part = |combo: &mut u32, increase: bool, value: i64| {
            if increase {
                *combo += 1;
            }
            max_part += Self::combo_value(*combo, value);
        };

        for obj in &beatmap.objects {
            match &obj.data {
                HitObjectData::Circle => part(&mut combo, true, 300),
                HitObjectData::Slider(s) => {
                    part(&mut combo, true, 30);
                    for cp in &s.checkpoints {
                        part(&mut combo, true, if cp.is_repeat { 30 } else { 10 });
                    }
                    part(&mut combo, true, 30);
                    part(&mut combo, false, 300);
                }
                HitObjectData::Spinner(_) => part(&mut combo, true, 300),
            }
        }

        self.combo_part_max = max_part;
    }

    fn modify_result(&self, result: HitResult, judgement: &JudgementResult) -> HitResult {
        // A slider whose head was missed can't judge above 100 in V2.
        if result == HitResult::Hit300 && !judgement.slider_head_hit {
            return HitResult::Hit100;
        }
        result
    }

    fn add_result(&mut self, result: HitResult, combo: ComboResult) {
        step_combo(&mut self.combo, combo);

        let value = result.score_value();
        match result {
            HitResult::SpinnerSpin => self.bonus += value as f64,
            // Bonus spins pay half of their V1 value.
            HitResult::SpinnerBonus => self.bonus += value as f64 / 2.0,
            _ => {
                self.combo_part += Self::combo_value(self.combo, value);

                if result.is_base() {
                    self.raw_acc_score += value;
                    self.judged += 1;
                }
            }
        }
    }

    fn score(&self) -> i64 {
        let combo_score = if self.combo_part_max > 0.0 {
            COMBO_PORTION * (self.combo_part / self.combo_part_max).min(1.0)
        } else {
            0.0
        };

        let progress = if self.total_objects > 0 {
            f64::from(self.judged) / f64::from(self.total_objects)
        } else {
            0.0
        };
        let acc_score = ACC_PORTION * self.accuracy().powi(10) * progress;

        ((combo_score + acc_score + self.bonus) * self.mod_multiplier).round() as i64
    }

    fn combo(&self) -> u32 {
        self.combo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::beatmap::{HitObject, Vector2};
    use crate::models::mods::Mods;

    fn circle_map(count: usize) -> Beatmap {
        let objects = (0..count)
            .map(|i| HitObject {
                start_time: 1000.0 + i as f64 * 500.0,
                pos: Vector2::new(100.0, 100.0),
                stack_index: 0,
                new_combo: i == 0,
                data: HitObjectData::Circle,
            })
            .collect();
        Beatmap::new(objects, 5.0, 4.0, 7.0, 9.0)
    }

    fn processor(map: &Beatmap) -> ScoreV2Processor {
        let diff = Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::SCORE_V2);
        let mut sc = ScoreV2Processor::new();
        sc.init(map, &diff);
        sc
    }

    #[test]
    fn test_flawless_run_reaches_the_cap() {
        let map = circle_map(10);
        let mut sc = processor(&map);

        for _ in 0..10 {
            sc.add_result(HitResult::Hit300, ComboResult::Increase);
        }

        assert_eq!(sc.score(), 1_000_000);
    }

    #[test]
    fn test_miss_costs_both_portions() {
        let map = circle_map(10);
        let mut sc = processor(&map);

        for _ in 0..9 {
            sc.add_result(HitResult::Hit300, ComboResult::Increase);
        }
        sc.add_result(HitResult::Miss, ComboResult::Reset);

        assert!(sc.score() < 1_000_000);
        assert_eq!(sc.combo(), 0);
    }

    #[test]
    fn test_head_miss_caps_slider_judgement() {
        let map = circle_map(1);
        let sc = processor(&map);

        let mut judgement = JudgementResult::new(
            0,
            0.0,
            Vector2::default(),
            HitResult::Hit300,
            ComboResult::Hold,
        );
        judgement.slider_head_hit = false;

        assert_eq!(
            sc.modify_result(HitResult::Hit300, &judgement),
            HitResult::Hit100
        );

        judgement.slider_head_hit = true;
        assert_eq!(
            sc.modify_result(HitResult::Hit300, &judgement),
            HitResult::Hit300
        );
    }
}
