//! Running score bookkeeping, one processor per scoring ruleset.

pub mod score_v1;
pub mod score_v2;

pub use score_v1::ScoreV1Processor;
pub use score_v2::ScoreV2Processor;

use crate::logic::results::{ComboResult, HitResult, JudgementResult};
use crate::models::beatmap::Beatmap;
use crate::models::difficulty::Difficulty;
use crate::models::mods::Mods;

/// Converts judgement results into a running score and combo.
pub trait ScoreProcessor {
    fn init(&mut self, beatmap: &Beatmap, diff: &Difficulty);

    /// Chance to downgrade a result before it is scored. Default: identity.
    fn modify_result(&self, result: HitResult, _judgement: &JudgementResult) -> HitResult {
        result
    }

    fn add_result(&mut self, result: HitResult, combo: ComboResult);

    fn score(&self) -> i64;

    fn combo(&self) -> u32;
}

/// Picks the processor for a modifier set.
pub fn processor_for(mods: Mods) -> Box<dyn ScoreProcessor> {
    if mods.active(Mods::SCORE_V2) {
        Box::new(ScoreV2Processor::new())
    } else {
        Box::new(ScoreV1Processor::new())
    }
}

/// Shared combo stepping used by both processors.
pub(crate) fn step_combo(combo: &mut u32, result: ComboResult) {
    match result {
        ComboResult::Reset => *combo = 0,
        ComboResult::Hold => {}
        ComboResult::Increase => *combo += 1,
    }
}
