//! Judgement result taxonomy emitted by object state machines.

use crate::models::beatmap::Vector2;
use serde::{Deserialize, Serialize};

/// Outcome of a single judgement.
///
/// Base outcomes carry hit counts and accuracy weight; slider and spinner
/// part results only carry raw score; `Ignore` and `PositionalMiss` are
/// pseudo-results that must never touch score or combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitResult {
    Hit300,
    Hit100,
    Hit50,
    Miss,

    /// Slider head or tick dropped; resets combo but is not a counted Miss.
    SliderMiss,
    SliderStart,
    SliderPoint,
    SliderRepeat,
    SliderEnd,

    SpinnerSpin,
    SpinnerBonus,

    /// Visual-only non-event (e.g. dropped slider end).
    Ignore,
    /// Click that landed on no object; feedback only.
    PositionalMiss,
}

impl HitResult {
    /// Raw score value of this result.
    pub fn score_value(self) -> i64 {
        match self {
            HitResult::Hit300 => 300,
            HitResult::Hit100 => 100,
            HitResult::Hit50 => 50,
            HitResult::SliderStart | HitResult::SliderRepeat | HitResult::SliderEnd => 30,
            HitResult::SliderPoint => 10,
            HitResult::SpinnerSpin => 100,
            HitResult::SpinnerBonus => 1000,
            _ => 0,
        }
    }

    /// Base outcomes are the ones that enter hit counts and accuracy.
    pub fn is_base(self) -> bool {
        matches!(
            self,
            HitResult::Hit300 | HitResult::Hit100 | HitResult::Hit50 | HitResult::Miss
        )
    }

    /// Results that must not affect score, combo or health.
    pub fn is_ignorable(self) -> bool {
        matches!(self, HitResult::Ignore | HitResult::PositionalMiss)
    }
}

/// Effect of a judgement on the combo counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboResult {
    Reset,
    Hold,
    Increase,
}

/// Bonus award attached at combo-group boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BonusAddition {
    #[default]
    None,
    /// Group finished, but not cleanly enough for a bonus.
    Mu,
    Katu,
    Geki,
}

/// One judgement, emitted by an object state machine and consumed immediately
/// by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgementResult {
    /// Ordinal index of the judged object in the beatmap.
    pub number: usize,
    pub time: f64,
    pub position: Vector2,
    pub hit_result: HitResult,
    pub combo_result: ComboResult,
    /// Filled in by the orchestrator at combo-group ends.
    pub bonus: BonusAddition,
    /// For sliders: whether the head was clicked. True for everything else.
    pub slider_head_hit: bool,
}

impl JudgementResult {
    pub fn new(
        number: usize,
        time: f64,
        position: Vector2,
        hit_result: HitResult,
        combo_result: ComboResult,
    ) -> Self {
        Self {
            number,
            time,
            position,
            hit_result,
            combo_result,
            bonus: BonusAddition::None,
            slider_head_hit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_values() {
        assert_eq!(HitResult::Hit300.score_value(), 300);
        assert_eq!(HitResult::SliderPoint.score_value(), 10);
        assert_eq!(HitResult::Miss.score_value(), 0);
        assert_eq!(HitResult::Ignore.score_value(), 0);
    }

    #[test]
    fn test_ignorable_results_are_not_base() {
        for r in [HitResult::Ignore, HitResult::PositionalMiss] {
            assert!(r.is_ignorable());
            assert!(!r.is_base());
        }
        assert!(HitResult::Miss.is_base());
        assert!(!HitResult::SliderMiss.is_base());
    }
}
