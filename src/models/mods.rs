//! Gameplay modifiers as a bitmask, plus the multipliers they carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Active modifier set for one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Mods(pub u32);

impl Mods {
    pub const NONE: Mods = Mods(0);
    pub const NO_FAIL: Mods = Mods(1);
    pub const EASY: Mods = Mods(1 << 1);
    pub const HIDDEN: Mods = Mods(1 << 3);
    pub const HARD_ROCK: Mods = Mods(1 << 4);
    pub const SUDDEN_DEATH: Mods = Mods(1 << 5);
    pub const DOUBLE_TIME: Mods = Mods(1 << 6);
    pub const RELAX: Mods = Mods(1 << 7);
    pub const HALF_TIME: Mods = Mods(1 << 8);
    pub const FLASHLIGHT: Mods = Mods(1 << 10);
    pub const SPUN_OUT: Mods = Mods(1 << 12);
    /// Autopilot ("Relax2" in the old numbering).
    pub const AUTOPILOT: Mods = Mods(1 << 13);
    pub const PERFECT: Mods = Mods(1 << 14);
    pub const SCORE_V2: Mods = Mods(1 << 29);

    /// True if any of the given mods is active.
    pub fn active(self, mods: Mods) -> bool {
        self.0 & mods.0 != 0
    }

    /// Subset of mods that changes precomputed difficulty attributes.
    /// Cursors sharing this mask share one attribute array.
    pub fn diff_mask(self) -> Mods {
        self & (Mods::EASY
            | Mods::HARD_ROCK
            | Mods::DOUBLE_TIME
            | Mods::HALF_TIME
            | Mods::FLASHLIGHT
            | Mods::RELAX
            | Mods::AUTOPILOT)
    }

    /// Playback speed multiplier.
    pub fn speed(self) -> f64 {
        if self.active(Mods::DOUBLE_TIME) {
            1.5
        } else if self.active(Mods::HALF_TIME) {
            0.75
        } else {
            1.0
        }
    }

    /// Score multiplier (product of per-mod factors, stable values).
    pub fn score_multiplier(self) -> f64 {
        let mut mult = 1.0;
        if self.active(Mods::NO_FAIL) {
            mult *= 0.5;
        }
        if self.active(Mods::EASY) {
            mult *= 0.5;
        }
        if self.active(Mods::HALF_TIME) {
            mult *= 0.3;
        }
        if self.active(Mods::HIDDEN) {
            mult *= 1.06;
        }
        if self.active(Mods::HARD_ROCK) {
            mult *= 1.06;
        }
        if self.active(Mods::DOUBLE_TIME) {
            mult *= 1.12;
        }
        if self.active(Mods::FLASHLIGHT) {
            mult *= 1.12;
        }
        if self.active(Mods::SPUN_OUT) {
            mult *= 0.9;
        }
        mult
    }
}

impl BitOr for Mods {
    type Output = Mods;

    fn bitor(self, rhs: Mods) -> Mods {
        Mods(self.0 | rhs.0)
    }
}

impl BitAnd for Mods {
    type Output = Mods;

    fn bitand(self, rhs: Mods) -> Mods {
        Mods(self.0 & rhs.0)
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Mods, &str); 13] = [
            (Mods::NO_FAIL, "NF"),
            (Mods::EASY, "EZ"),
            (Mods::HIDDEN, "HD"),
            (Mods::HARD_ROCK, "HR"),
            (Mods::SUDDEN_DEATH, "SD"),
            (Mods::DOUBLE_TIME, "DT"),
            (Mods::RELAX, "RX"),
            (Mods::HALF_TIME, "HT"),
            (Mods::FLASHLIGHT, "FL"),
            (Mods::SPUN_OUT, "SO"),
            (Mods::AUTOPILOT, "AP"),
            (Mods::PERFECT, "PF"),
            (Mods::SCORE_V2, "V2"),
        ];

        if self.0 == 0 {
            return write!(f, "NM");
        }

        for (m, name) in NAMES {
            if self.active(m) {
                write!(f, "{}", name)?;
            }
        }
        Ok(())
    }
}
