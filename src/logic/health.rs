//! Health drain and fail signaling.
//!
//! The orchestrator never touches drain math; it calls the methods here and
//! drains the latched fail signal after every mutating call. Health lives in
//! [0, 1].

use crate::logic::results::HitResult;
use crate::models::beatmap::Beatmap;
use crate::models::difficulty::Difficulty;

pub struct HealthProcessor {
    health: f64,
    /// Passive drain per millisecond.
    drain_rate: f64,
    /// Drain only runs while objects are on screen.
    drain_start: f64,
    drain_end: f64,
    last_time: Option<f64>,
    /// HP drain difficulty after mods.
    hp: f64,
    fail_pending: bool,
}

impl HealthProcessor {
    pub fn new(beatmap: &Beatmap, diff: &Difficulty) -> Self {
        Self {
            health: 1.0,
            drain_rate: 0.00002 * (1.0 + diff.hp / 2.0),
            drain_start: beatmap.first_start_time(),
            drain_end: beatmap.last_end_time(),
            last_time: None,
            hp: diff.hp,
            fail_pending: false,
        }
    }

    pub fn reset(&mut self) {
        self.health = 1.0;
        self.last_time = None;
        self.fail_pending = false;
    }

    /// Advances passive drain to `time`.
    pub fn update(&mut self, time: f64) {
        let last = self.last_time.unwrap_or(time);
        self.last_time = Some(time);

        let from = last.max(self.drain_start);
        let to = time.min(self.drain_end);

        if to > from {
            self.apply(-(to - from) * self.drain_rate, true);
        }
    }

    /// Applies the health effect of a judgement.
    pub fn add_result(&mut self, result: HitResult) {
        let delta = match result {
            HitResult::Hit300 => 0.01,
            HitResult::Hit100 => 0.005,
            HitResult::Hit50 => 0.002,
            HitResult::Miss => -(0.02 + 0.04 * self.hp / 10.0),
            HitResult::SliderMiss => -(0.01 + 0.02 * self.hp / 10.0),
            HitResult::SliderStart | HitResult::SliderRepeat | HitResult::SliderEnd => 0.004,
            HitResult::SliderPoint => 0.003,
            HitResult::SpinnerSpin => 0.002,
            HitResult::SpinnerBonus => 0.004,
            HitResult::Ignore | HitResult::PositionalMiss => 0.0,
        };

        self.apply(delta, true);
    }

    /// Large instantaneous absolute adjustment. With `can_fail` unset the
    /// health just clamps silently.
    pub fn increase(&mut self, amount: f64, can_fail: bool) {
        self.apply(amount, can_fail);
    }

    /// Adjustment relative to the full bar.
    pub fn increase_relative(&mut self, fraction: f64, can_fail: bool) {
        self.apply(fraction, can_fail);
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    /// Takes the latched fail signal, if any. The orchestrator polls this
    /// after every mutating call; no callbacks run from inside the processor.
    pub fn take_fail_signal(&mut self) -> bool {
        std::mem::take(&mut self.fail_pending)
    }

    fn apply(&mut self, delta: f64, can_fail: bool) {
        self.health = (self.health + delta).clamp(0.0, 1.0);
        if can_fail && self.health <= 0.0 {
            self.fail_pending = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::beatmap::{HitObject, HitObjectData, Vector2};
    use crate::models::mods::Mods;

    fn setup() -> HealthProcessor {
        let objects = vec![
            HitObject {
                start_time: 1000.0,
                pos: Vector2::new(100.0, 100.0),
                stack_index: 0,
                new_combo: true,
                data: HitObjectData::Circle,
            },
            HitObject {
                start_time: 60_000.0,
                pos: Vector2::new(200.0, 200.0),
                stack_index: 0,
                new_combo: false,
                data: HitObjectData::Circle,
            },
        ];
        let map = Beatmap::new(objects, 5.0, 4.0, 7.0, 9.0);
        let diff = Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::NONE);
        HealthProcessor::new(&map, &diff)
    }

    #[test]
    fn test_passive_drain_lowers_health() {
        let mut hp = setup();
        hp.update(1000.0);
        hp.update(11_000.0);
        assert!(hp.health() < 1.0);
    }

    #[test]
    fn test_no_drain_before_first_object() {
        let mut hp = setup();
        hp.update(0.0);
        hp.update(900.0);
        assert_eq!(hp.health(), 1.0);
    }

    #[test]
    fn test_drain_to_zero_signals_fail_once() {
        let mut hp = setup();
        hp.update(1000.0);
        hp.increase(-2.0, true);
        assert_eq!(hp.health(), 0.0);
        assert!(hp.take_fail_signal());
        assert!(!hp.take_fail_signal());
    }

    #[test]
    fn test_silent_cut_does_not_signal() {
        let mut hp = setup();
        hp.increase(-2.0, false);
        assert_eq!(hp.health(), 0.0);
        assert!(!hp.take_fail_signal());
    }

    #[test]
    fn test_results_move_health() {
        let mut hp = setup();
        hp.increase(-0.5, false);
        let before = hp.health();

        hp.add_result(HitResult::Hit300);
        assert!(hp.health() > before);

        let before = hp.health();
        hp.add_result(HitResult::Miss);
        assert!(hp.health() < before);

        let before = hp.health();
        hp.add_result(HitResult::Ignore);
        assert_eq!(hp.health(), before);
    }

    #[test]
    fn test_relative_restore() {
        let mut hp = setup();
        hp.increase(-1.0, false);
        hp.increase_relative(0.8, false);
        assert!((hp.health() - 0.8).abs() < 1e-12);
    }
}
