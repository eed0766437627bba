//! Per-cursor difficulty values: hit windows, radii, rate-adjusted AR/OD.
//!
//! All windows are expressed in map time; rate mods change playback speed,
//! not the windows themselves. The `*_real` values fold the rate back in and
//! are only consumed by the performance valuator.

use crate::logic::results::HitResult;
use crate::models::mods::Mods;

/// Base range (ms) within which a click is routed to an object at all.
pub const HITTABLE_RANGE: f64 = 400.0;

/// Ratio of the follow circle radius to the hit circle radius.
pub const FOLLOW_RADIUS_SCALE: f32 = 2.4;

#[derive(Debug, Clone)]
pub struct Difficulty {
    pub mods: Mods,

    pub hp: f64,
    pub cs: f64,
    pub od: f64,
    pub ar: f64,

    /// Hit windows in map-time milliseconds.
    pub hit300: f64,
    pub hit100: f64,
    pub hit50: f64,

    /// Hit circle radius in osu! pixels.
    pub radius: f32,

    /// Time (map ms) an object is visible before its hit time.
    pub preempt: f64,

    /// Rate-adjusted values as the performance model sees them.
    pub ar_real: f64,
    pub od_real: f64,
}

impl Difficulty {
    pub fn new(base_hp: f64, base_cs: f64, base_od: f64, base_ar: f64, mods: Mods) -> Self {
        let (hp, cs, od, ar) = if mods.active(Mods::HARD_ROCK) {
            (
                (base_hp * 1.4).min(10.0),
                (base_cs * 1.3).min(10.0),
                (base_od * 1.4).min(10.0),
                (base_ar * 1.4).min(10.0),
            )
        } else if mods.active(Mods::EASY) {
            (base_hp * 0.5, base_cs * 0.5, base_od * 0.5, base_ar * 0.5)
        } else {
            (base_hp, base_cs, base_od, base_ar)
        };

        let hit300 = 80.0 - 6.0 * od;
        let hit100 = 140.0 - 8.0 * od;
        let hit50 = 200.0 - 10.0 * od;

        let speed = mods.speed();

        let preempt = if ar < 5.0 {
            1200.0 + 600.0 * (5.0 - ar) / 5.0
        } else {
            1200.0 - 750.0 * (ar - 5.0) / 5.0
        };

        let preempt_real = preempt / speed;
        let ar_real = if preempt_real > 1200.0 {
            (1800.0 - preempt_real) / 120.0
        } else {
            (1200.0 - preempt_real) / 150.0 + 5.0
        };

        let od_real = (80.0 - hit300 / speed) / 6.0;

        Self {
            mods,
            hp,
            cs,
            od,
            ar,
            hit300,
            hit100,
            hit50,
            radius: (54.4 - 4.48 * cs) as f32,
            preempt,
            ar_real,
            od_real,
        }
    }

    /// Follow circle radius used for slider tracking.
    pub fn follow_radius(&self) -> f32 {
        self.radius * FOLLOW_RADIUS_SCALE
    }

    /// Range within which a click is routed to an object (Autopilot shrinks it).
    pub fn hittable_range(&self) -> f64 {
        if self.mods.active(Mods::AUTOPILOT) {
            HITTABLE_RANGE - 200.0
        } else {
            HITTABLE_RANGE
        }
    }

    /// Maps a signed click delta (click time minus object time) to a result.
    /// Clicks inside the hittable range but outside the 50 window are misses.
    /// Returns `None` outside the hittable range entirely.
    pub fn judge_delta(&self, delta: f64) -> Option<HitResult> {
        let abs = delta.abs();

        if abs <= self.hit300 {
            Some(HitResult::Hit300)
        } else if abs <= self.hit100 {
            Some(HitResult::Hit100)
        } else if abs <= self.hit50 {
            Some(HitResult::Hit50)
        } else if abs < self.hittable_range() {
            Some(HitResult::Miss)
        } else {
            None
        }
    }
}
