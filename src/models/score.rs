//! Score snapshot and grade ladder.
//!
//! `Score` is the externally visible state of one cursor's run; only the
//! orchestrator mutates it, everyone else reads it.

use crate::difficulty::performance::PpResults;
use crate::models::mods::Mods;
use serde::{Deserialize, Serialize};

/// Grade ladder, best to worst. `SSH`/`SH` are the high-visibility-modifier
/// variants of `SS`/`S` (same thresholds, different glyph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grade {
    SSH,
    SS,
    SH,
    S,
    A,
    B,
    C,
    D,
    /// No objects judged yet.
    #[default]
    None,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::SSH => "SSH",
            Grade::SS => "SS",
            Grade::SH => "SH",
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::None => "-",
        }
    }
}

/// Externally visible snapshot of a cursor's run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    pub score: i64,
    pub accuracy: f64,
    pub grade: Grade,
    /// Best combo reached so far.
    pub combo: u32,
    pub perfect_combo: bool,
    pub count300: u32,
    pub count_geki: u32,
    pub count100: u32,
    pub count_katu: u32,
    pub count50: u32,
    pub count_miss: u32,
    /// Combo breaks that were not counted misses (dropped slider parts).
    pub count_slider_breaks: u32,
    pub pp: PpResults,
}

impl Score {
    pub fn new() -> Self {
        Self {
            accuracy: 100.0,
            ..Default::default()
        }
    }

    /// Total judged objects so far.
    pub fn total_hits(&self) -> u32 {
        self.count300 + self.count100 + self.count50 + self.count_miss
    }

    /// Recomputes the grade from the current counts.
    ///
    /// The plain-ratio branches of the A and B tiers are inclusive so that
    /// exactly 90% perfects with a miss still grades A; the S tier and the
    /// zero-miss branches stay strict.
    pub fn update_grade(&mut self, mods: Mods) {
        let total = self.total_hits();
        if total == 0 {
            self.grade = Grade::None;
            return;
        }

        let high_visibility = mods.active(Mods::HIDDEN | Mods::FLASHLIGHT);
        let ratio = f64::from(self.count300) / f64::from(total);
        let ratio50 = f64::from(self.count50) / f64::from(total);

        self.grade = if self.count300 == total {
            if high_visibility { Grade::SSH } else { Grade::SS }
        } else if ratio > 0.9 && ratio50 < 0.01 && self.count_miss == 0 {
            if high_visibility { Grade::SH } else { Grade::S }
        } else if (ratio > 0.8 && self.count_miss == 0) || ratio >= 0.9 {
            Grade::A
        } else if (ratio > 0.7 && self.count_miss == 0) || ratio >= 0.8 {
            Grade::B
        } else if ratio > 0.6 {
            Grade::C
        } else {
            Grade::D
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_with(c300: u32, c100: u32, c50: u32, miss: u32) -> Score {
        Score {
            count300: c300,
            count100: c100,
            count50: c50,
            count_miss: miss,
            ..Score::new()
        }
    }

    #[test]
    fn test_all_perfect_is_ss() {
        let mut s = score_with(10, 0, 0, 0);
        s.update_grade(Mods::NONE);
        assert_eq!(s.grade, Grade::SS);

        s.update_grade(Mods::HIDDEN);
        assert_eq!(s.grade, Grade::SSH);
    }

    #[test]
    fn test_nine_of_ten_with_miss_is_a() {
        // 90% perfects exactly; the miss knocks out the zero-miss branches
        // but the inclusive plain-ratio branch keeps the A.
        let mut s = score_with(9, 0, 0, 1);
        s.update_grade(Mods::NONE);
        assert_eq!(s.grade, Grade::A);
    }

    #[test]
    fn test_clean_high_ratio_is_s() {
        let mut s = score_with(95, 5, 0, 0);
        s.update_grade(Mods::NONE);
        assert_eq!(s.grade, Grade::S);

        s.update_grade(Mods::FLASHLIGHT);
        assert_eq!(s.grade, Grade::SH);
    }

    #[test]
    fn test_grade_never_improves_with_more_misses() {
        // Same perfect count, growing miss count: grade can only get worse.
        let order = |g: Grade| match g {
            Grade::SSH | Grade::SS => 0,
            Grade::SH | Grade::S => 1,
            Grade::A => 2,
            Grade::B => 3,
            Grade::C => 4,
            Grade::D => 5,
            Grade::None => 6,
        };

        let mut prev = 0;
        for miss in 0..20 {
            let mut s = score_with(80, 20, 0, miss);
            s.update_grade(Mods::NONE);
            let rank = order(s.grade);
            assert!(rank >= prev, "grade improved when misses grew");
            prev = rank;
        }
    }

    #[test]
    fn test_low_ratio_grades() {
        let mut s = score_with(65, 35, 0, 0);
        s.update_grade(Mods::NONE);
        assert_eq!(s.grade, Grade::C);

        let mut s = score_with(40, 60, 0, 0);
        s.update_grade(Mods::NONE);
        assert_eq!(s.grade, Grade::D);
    }
}
