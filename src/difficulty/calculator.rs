//! Step difficulty calculator.
//!
//! Produces one [`Attributes`] entry per object: the difficulty of the map
//! truncated after that object. The valuator indexes this array by "objects
//! judged so far", so entries must grow monotonically with object count.
//!
//! Strain-decay model: each object adds aim strain (jump distance over time)
//! and speed strain (interval pressure); per-section strain peaks are
//! combined as a geometrically weighted sum, the way classic skill ratings
//! aggregate.

use crate::difficulty::attributes::Attributes;
use crate::models::beatmap::{Beatmap, HitObjectData};
use crate::models::difficulty::Difficulty;
use crate::models::mods::Mods;

const SECTION_LENGTH: f64 = 400.0;
const STAR_SCALING: f64 = 0.0675;
const DECAY_WEIGHT: f64 = 0.9;

const AIM_DECAY: f64 = 0.15;
const SPEED_DECAY: f64 = 0.3;
const FLASHLIGHT_DECAY: f64 = 0.15;

/// Minimum delta time used for strain math; shorter intervals are treated as
/// simultaneous (stacked notes would otherwise explode the strain).
const MIN_DELTA: f64 = 25.0;

struct Skill {
    decay_base: f64,
    current_strain: f64,
    current_section_peak: f64,
    current_section_end: f64,
    peaks: Vec<f64>,
}

impl Skill {
    fn new(decay_base: f64) -> Self {
        Self {
            decay_base,
            current_strain: 0.0,
            current_section_peak: 0.0,
            current_section_end: 0.0,
            peaks: Vec::new(),
        }
    }

    fn strain_decay(&self, ms: f64) -> f64 {
        self.decay_base.powf(ms / 1000.0)
    }

    fn process(&mut self, time: f64, delta: f64, value: f64) {
        if self.current_section_end == 0.0 {
            self.current_section_end = (time / SECTION_LENGTH).ceil() * SECTION_LENGTH;
        }

        while time > self.current_section_end {
            self.peaks.push(self.current_section_peak);
            // New section starts from the strain decayed to its boundary.
            self.current_section_peak =
                self.current_strain * self.strain_decay(self.current_section_end - (time - delta));
            self.current_section_end += SECTION_LENGTH;
        }

        self.current_strain *= self.strain_decay(delta);
        self.current_strain += value;
        self.current_section_peak = self.current_section_peak.max(self.current_strain);
    }

    /// Weighted sum of strain peaks, hardest first.
    fn difficulty_value(&self) -> f64 {
        let mut peaks: Vec<f64> = self.peaks.clone();
        peaks.push(self.current_section_peak);
        peaks.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let mut total = 0.0;
        let mut weight = 1.0;
        for peak in peaks {
            total += peak * weight;
            weight *= DECAY_WEIGHT;
        }
        total
    }

    fn rating(&self) -> f64 {
        self.difficulty_value().sqrt() * STAR_SCALING
    }
}

/// Computes the per-object attribute array for one difficulty-mod mask.
pub fn calculate_step(beatmap: &Beatmap, diff: &Difficulty) -> Vec<Attributes> {
    let speed_mult = diff.mods.speed();
    let with_flashlight = diff.mods.active(Mods::FLASHLIGHT);

    let mut aim = Skill::new(AIM_DECAY);
    let mut speed = Skill::new(SPEED_DECAY);
    let mut flashlight = Skill::new(FLASHLIGHT_DECAY);

    let mut attribs = Vec::with_capacity(beatmap.objects.len());

    let mut circles = 0u32;
    let mut sliders = 0u32;
    let mut spinners = 0u32;
    let mut max_combo = 0u32;
    let mut speed_note_count = 0.0;

    for (i, obj) in beatmap.objects.iter().enumerate() {
        match &obj.data {
            HitObjectData::Circle => circles += 1,
            HitObjectData::Slider(_) => sliders += 1,
            HitObjectData::Spinner(_) => spinners += 1,
        }
        max_combo += obj.combo_units();

        if i > 0 {
            let prev = &beatmap.objects[i - 1];

            // Rate mods compress real time; strains live in real time.
            let delta = ((obj.start_time - prev.end_time()) / speed_mult).max(MIN_DELTA);
            let time = obj.start_time / speed_mult;

            let dist = f64::from(prev.pos.distance(obj.pos));

            // Spinners contribute no aim; travel to and from them is free.
            let aim_value = if obj.data.is_spinner() || prev.data.is_spinner() {
                0.0
            } else {
                26.25 * dist.powf(0.99) / delta
            };
            aim.process(time, delta, aim_value);

            let speed_value = 40.0 / delta;
            speed.process(time, delta, speed_value);
            speed_note_count += ((190.0 - delta) / 100.0).clamp(0.0, 1.0);

            if with_flashlight {
                // Reading under flashlight scales with raw travel distance.
                let fl_value = dist / delta * 1.3;
                flashlight.process(time, delta, fl_value);
            }
        }

        // Share of aim that survives lazy slider play: shrinks as sliders
        // carry more of the map's movement.
        let slider_share = f64::from(sliders) / (i + 1) as f64;
        let slider_factor = (1.0 - 0.15 * slider_share).clamp(0.5, 1.0);

        attribs.push(Attributes {
            aim: aim.rating(),
            speed: speed.rating(),
            flashlight: if with_flashlight {
                flashlight.rating()
            } else {
                0.0
            },
            slider_factor,
            speed_note_count,
            circles,
            sliders,
            spinners,
            object_count: (i + 1) as u32,
            max_combo,
        });
    }

    attribs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::beatmap::{HitObject, Vector2};

    fn jump_map(count: usize, spacing_ms: f64, jump: f32) -> Beatmap {
        let objects = (0..count)
            .map(|i| HitObject {
                start_time: 1000.0 + i as f64 * spacing_ms,
                pos: Vector2::new(if i % 2 == 0 { 100.0 } else { 100.0 + jump }, 200.0),
                stack_index: 0,
                new_combo: i % 4 == 0,
                data: HitObjectData::Circle,
            })
            .collect();
        Beatmap::new(objects, 5.0, 4.0, 7.0, 9.0)
    }

    #[test]
    fn test_one_entry_per_object() {
        let map = jump_map(50, 150.0, 120.0);
        let diff = Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::NONE);
        let attribs = calculate_step(&map, &diff);
        assert_eq!(attribs.len(), 50);
        assert_eq!(attribs[49].object_count, 50);
        assert_eq!(attribs[49].max_combo, 50);
    }

    #[test]
    fn test_ratings_grow_with_object_count() {
        let map = jump_map(100, 150.0, 120.0);
        let diff = Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::NONE);
        let attribs = calculate_step(&map, &diff);

        for pair in attribs.windows(2) {
            assert!(pair[1].aim >= pair[0].aim - 1e-9);
            assert!(pair[1].max_combo >= pair[0].max_combo);
        }
    }

    #[test]
    fn test_double_time_raises_speed_rating() {
        let map = jump_map(100, 150.0, 120.0);
        let nm = calculate_step(&map, &Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::NONE));
        let dt = calculate_step(&map, &Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::DOUBLE_TIME));
        assert!(dt[99].speed > nm[99].speed);
    }

    #[test]
    fn test_flashlight_rating_gated_by_mod() {
        let map = jump_map(60, 150.0, 160.0);
        let nm = calculate_step(&map, &Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::NONE));
        let fl = calculate_step(&map, &Difficulty::new(5.0, 4.0, 7.0, 9.0, Mods::FLASHLIGHT));
        assert_eq!(nm[59].flashlight, 0.0);
        assert!(fl[59].flashlight > 0.0);
    }
}
