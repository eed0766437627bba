//! Performance valuator: converts difficulty attributes plus cumulative
//! judgement counts into skill values and a single pp total.
//!
//! Closed-form model, pure in its inputs. The orchestrator recomputes it from
//! scratch after every judged object; the formula is not associative across
//! partial updates, so nothing here is incremental.

use crate::difficulty::attributes::Attributes;
use crate::models::difficulty::Difficulty;
use crate::models::mods::Mods;
use serde::{Deserialize, Serialize};

const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.14;

/// Diminishing-returns transform from a star rating to a base skill value.
fn pp_base(stars: f64) -> f64 {
    (5.0 * (stars / 0.0675).max(1.0) - 4.0).powi(3) / 100_000.0
}

/// Cumulative judgement state fed to the valuator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfScore {
    /// Best combo reached.
    pub max_combo: u32,
    pub count_great: u32,
    pub count_ok: u32,
    pub count_meh: u32,
    pub count_miss: u32,
}

impl PerfScore {
    pub fn total_hits(&self) -> u32 {
        self.count_great + self.count_ok + self.count_meh + self.count_miss
    }

    /// Accuracy in [0, 1]; 1 when nothing was judged yet.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_hits();
        if total == 0 {
            return 1.0;
        }

        let raw = 300 * self.count_great + 100 * self.count_ok + 50 * self.count_meh;
        f64::from(raw) / f64::from(300 * total)
    }
}

/// Skill value breakdown plus the combined total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PpResults {
    pub aim: f64,
    pub speed: f64,
    pub acc: f64,
    pub flashlight: f64,
    pub total: f64,
}

/// One-shot calculator; build it, call [`Performance::calculate`].
pub struct Performance<'a> {
    attribs: Attributes,
    score: PerfScore,
    diff: &'a Difficulty,

    effective_miss_count: f64,
    total_hits: u32,
    objects_with_accuracy: u32,
}

impl<'a> Performance<'a> {
    pub fn new(attribs: Attributes, score: PerfScore, diff: &'a Difficulty) -> Self {
        Self {
            attribs,
            score,
            diff,
            effective_miss_count: 0.0,
            total_hits: 0,
            objects_with_accuracy: 0,
        }
    }

    pub fn calculate(mut self) -> PpResults {
        self.attribs.max_combo = self.attribs.max_combo.max(1);
        self.total_hits = self.score.total_hits();
        self.effective_miss_count = self.effective_miss_count();

        self.objects_with_accuracy = if self.diff.mods.active(Mods::SCORE_V2) {
            self.attribs.circles + self.attribs.sliders
        } else {
            self.attribs.circles
        };

        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.diff.mods.active(Mods::NO_FAIL) {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.90);
        }

        if self.diff.mods.active(Mods::SPUN_OUT) && self.total_hits > 0 {
            multiplier *= 1.0
                - (f64::from(self.attribs.spinners) / f64::from(self.total_hits)).powf(0.85);
        }

        if self.diff.mods.active(Mods::RELAX) {
            // Rhythm errors still cost something under RX.
            let (ok_multiplier, meh_multiplier) = if self.diff.od_real > 0.0 {
                (
                    (1.0 - (self.diff.od_real / 13.33).powf(1.8)).max(0.0),
                    (1.0 - (self.diff.od_real / 13.33).powi(5)).max(0.0),
                )
            } else {
                (1.0, 1.0)
            };

            self.effective_miss_count = (self.effective_miss_count
                + f64::from(self.score.count_ok) * ok_multiplier
                + f64::from(self.score.count_meh) * meh_multiplier)
                .min(f64::from(self.total_hits));
        }

        let mut results = PpResults {
            aim: self.aim_value(),
            speed: self.speed_value(),
            acc: self.accuracy_value(),
            flashlight: self.flashlight_value(),
            total: 0.0,
        };

        results.total = (results.aim.powf(1.1)
            + results.speed.powf(1.1)
            + results.acc.powf(1.1)
            + results.flashlight.powf(1.1))
        .powf(1.0 / 1.1)
            * multiplier;

        results
    }

    fn length_bonus(&self) -> f64 {
        let total = f64::from(self.total_hits);
        let mut bonus = 0.95 + 0.4 * (total / 2000.0).min(1.0);
        if self.total_hits > 2000 {
            bonus += (total / 2000.0).log10() * 0.5;
        }
        bonus
    }

    fn aim_value(&self) -> f64 {
        let mut aim = pp_base(self.attribs.aim);

        let length_bonus = self.length_bonus();
        aim *= length_bonus;

        if self.effective_miss_count > 0.0 {
            aim *= 0.97
                * (1.0
                    - (self.effective_miss_count / f64::from(self.total_hits)).powf(0.775))
                .powf(self.effective_miss_count);
        }

        aim *= self.combo_scaling_factor();

        let mut ar_factor = 0.0;
        if self.diff.ar_real > 10.33 {
            ar_factor = 0.3 * (self.diff.ar_real - 10.33);
        } else if self.diff.ar_real < 8.0 {
            ar_factor = 0.05 * (8.0 - self.diff.ar_real);
        }

        if self.diff.mods.active(Mods::RELAX) {
            ar_factor = 0.0;
        }

        aim *= 1.0 + ar_factor * length_bonus;

        if self.diff.mods.active(Mods::HIDDEN) {
            aim *= 1.0 + 0.04 * (12.0 - self.diff.ar_real);
        }

        // Assume 15% of sliders are actually hard to keep full combo through.
        let estimate_difficult_sliders = f64::from(self.attribs.sliders) * 0.15;

        if self.attribs.sliders > 0 {
            let relevant = (self.score.count_ok + self.score.count_meh + self.score.count_miss)
                .min(self.attribs.max_combo.saturating_sub(self.score.max_combo));
            let ends_dropped = f64::from(relevant).clamp(0.0, estimate_difficult_sliders);

            let slider_nerf_factor = (1.0 - self.attribs.slider_factor)
                * (1.0 - ends_dropped / estimate_difficult_sliders).powi(3)
                + self.attribs.slider_factor;
            aim *= slider_nerf_factor;
        }

        aim *= self.score.accuracy();
        aim *= 0.98 + self.diff.od_real.powi(2) / 2500.0;

        aim
    }

    fn speed_value(&self) -> f64 {
        if self.diff.mods.active(Mods::RELAX) {
            return 0.0;
        }

        let mut speed = pp_base(self.attribs.speed);

        let length_bonus = self.length_bonus();
        speed *= length_bonus;

        if self.effective_miss_count > 0.0 {
            speed *= 0.97
                * (1.0
                    - (self.effective_miss_count / f64::from(self.total_hits)).powf(0.775))
                .powf(self.effective_miss_count.powf(0.875));
        }

        speed *= self.combo_scaling_factor();

        let mut ar_factor = 0.0;
        if self.diff.ar_real > 10.33 {
            ar_factor = 0.3 * (self.diff.ar_real - 10.33);
        }

        speed *= 1.0 + ar_factor * length_bonus;

        if self.diff.mods.active(Mods::HIDDEN) {
            speed *= 1.0 + 0.04 * (12.0 - self.diff.ar_real);
        }

        // Accuracy over the speed-relevant portion of the map only.
        let mut relevant_accuracy = 0.0;
        if self.attribs.speed_note_count != 0.0 {
            let total = f64::from(self.total_hits);
            let great = f64::from(self.score.count_great);
            let ok = f64::from(self.score.count_ok);
            let meh = f64::from(self.score.count_meh);

            let relevant_total_diff = total - self.attribs.speed_note_count;
            let relevant_great = (great - relevant_total_diff).max(0.0);
            let relevant_ok = (ok - (relevant_total_diff - great).max(0.0)).max(0.0);
            let relevant_meh = (meh - (relevant_total_diff - great - ok).max(0.0)).max(0.0);

            relevant_accuracy = (relevant_great * 6.0 + relevant_ok * 2.0 + relevant_meh)
                / (self.attribs.speed_note_count * 6.0);
        }

        let od = self.diff.od_real;
        speed *= (0.95 + od.powi(2) / 750.0)
            * ((self.score.accuracy() + relevant_accuracy) / 2.0).powf((14.5 - od.max(8.0)) / 2.0);

        // Punish doubletapping through 50s.
        let meh = f64::from(self.score.count_meh);
        let total = f64::from(self.total_hits);
        if meh >= total / 500.0 {
            speed *= 0.99_f64.powf(meh - total / 500.0);
        }

        speed
    }

    fn accuracy_value(&self) -> f64 {
        if self.diff.mods.active(Mods::RELAX) {
            return 0.0;
        }

        // Only objects with a timing window count here.
        let mut better_accuracy = 0.0;
        if self.objects_with_accuracy > 0 {
            let amount = i64::from(self.objects_with_accuracy);
            let extra = i64::from(self.total_hits) - amount;
            better_accuracy = ((i64::from(self.score.count_great) - extra) * 6
                + i64::from(self.score.count_ok) * 2
                + i64::from(self.score.count_meh)) as f64
                / (amount * 6) as f64;
        }

        if better_accuracy < 0.0 {
            better_accuracy = 0.0;
        }

        let mut acc = 1.52163_f64.powf(self.diff.od_real) * better_accuracy.powi(24) * 2.83;

        // Holding accuracy over many circles is harder.
        acc *= (f64::from(self.objects_with_accuracy) / 1000.0).powf(0.3).min(1.15);

        if self.diff.mods.active(Mods::HIDDEN) {
            acc *= 1.08;
        }
        if self.diff.mods.active(Mods::FLASHLIGHT) {
            acc *= 1.02;
        }

        acc
    }

    fn flashlight_value(&self) -> f64 {
        if !self.diff.mods.active(Mods::FLASHLIGHT) {
            return 0.0;
        }

        let mut flashlight = self.attribs.flashlight.powi(2) * 25.0;

        if self.effective_miss_count > 0.0 {
            flashlight *= 0.97
                * (1.0
                    - (self.effective_miss_count / f64::from(self.total_hits)).powf(0.775))
                .powf(self.effective_miss_count.powf(0.875));
        }

        flashlight *= self.combo_scaling_factor();

        // Short maps spend more of their length at small visible radius.
        let total = f64::from(self.total_hits);
        let mut scale = 0.7 + 0.1 * (total / 200.0).min(1.0);
        if self.total_hits > 200 {
            scale += 0.2 * ((total - 200.0) / 200.0).min(1.0);
        }
        flashlight *= scale;

        flashlight *= 0.5 + self.score.accuracy() / 2.0;
        flashlight *= 0.98 + self.diff.od_real.powi(2) / 2500.0;

        flashlight
    }

    /// Misses implied by the combo shortfall when the actual miss count
    /// cannot be trusted (slider breaks don't count as misses).
    fn effective_miss_count(&self) -> f64 {
        let mut combo_based = 0.0;

        if self.attribs.sliders > 0 {
            let full_combo_threshold =
                f64::from(self.attribs.max_combo) - 0.1 * f64::from(self.attribs.sliders);
            if f64::from(self.score.max_combo) < full_combo_threshold {
                combo_based = full_combo_threshold / f64::from(self.score.max_combo.max(1));
            }
        }

        combo_based = combo_based.min(f64::from(
            self.score.count_ok + self.score.count_meh + self.score.count_miss,
        ));

        f64::from(self.score.count_miss).max(combo_based)
    }

    fn combo_scaling_factor(&self) -> f64 {
        if self.attribs.max_combo == 0 {
            1.0
        } else {
            (f64::from(self.score.max_combo).powf(0.8)
                / f64::from(self.attribs.max_combo).powf(0.8))
            .min(1.0)
        }
    }
}
