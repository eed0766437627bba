//! Structures de beatmap côté gameplay : objets, positions, timing.
//!
//! Parsing of `.osu` files is not this crate's job; an external loader fills
//! these structures and the engine only reads them.

use serde::{Deserialize, Serialize};

/// 2D playfield position in osu! pixels (512x384 playfield).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Vector2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle of the vector from this point to `other`, in radians.
    pub fn angle_to(&self, other: Vector2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// A point on a slider's path the cursor must be tracking at a given time.
///
/// Ticks, repeats and the end checkpoint are all precomputed by the loader;
/// the engine never evaluates curve math itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub time: f64,
    pub pos: Vector2,
    pub is_repeat: bool,
}

/// Slider-specific data.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderData {
    /// Tick and repeat checkpoints, time-ordered, end checkpoint excluded.
    pub checkpoints: Vec<PathPoint>,
    /// Position of the slider tail.
    pub end_pos: Vector2,
    /// Time at which the slider ends.
    pub end_time: f64,
}

/// Spinner-specific data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinnerData {
    pub end_time: f64,
}

/// Kind of gameplay object. Closed set: the engine matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum HitObjectData {
    Circle,
    Slider(SliderData),
    Spinner(SpinnerData),
}

impl HitObjectData {
    pub fn is_circle(&self) -> bool {
        matches!(self, HitObjectData::Circle)
    }

    pub fn is_slider(&self) -> bool {
        matches!(self, HitObjectData::Slider(_))
    }

    pub fn is_spinner(&self) -> bool {
        matches!(self, HitObjectData::Spinner(_))
    }
}

/// A timed gameplay object the player must act on.
#[derive(Debug, Clone, PartialEq)]
pub struct HitObject {
    pub start_time: f64,
    pub pos: Vector2,
    /// Stacking offset rank computed by the loader (0 = not stacked).
    pub stack_index: i32,
    /// Whether this object starts a new combo group.
    pub new_combo: bool,
    pub data: HitObjectData,
}

impl HitObject {
    /// Time at which the object is fully over.
    pub fn end_time(&self) -> f64 {
        match &self.data {
            HitObjectData::Circle => self.start_time,
            HitObjectData::Slider(s) => s.end_time,
            HitObjectData::Spinner(s) => s.end_time,
        }
    }

    /// Position shifted by the stack offset for the given circle radius.
    pub fn stacked_pos(&self, radius: f32) -> Vector2 {
        // Stable's stack offset scales with circle size.
        let off = self.stack_index as f32 * (radius / 10.0);
        Vector2::new(self.pos.x - off, self.pos.y - off)
    }

    /// Combo contribution of this object (head + ticks + repeats + tail).
    pub fn combo_units(&self) -> u32 {
        match &self.data {
            HitObjectData::Circle => 1,
            HitObjectData::Slider(s) => 2 + s.checkpoints.len() as u32,
            HitObjectData::Spinner(_) => 1,
        }
    }
}

/// A loaded beatmap: time-ordered objects plus base difficulty values.
#[derive(Debug, Clone)]
pub struct Beatmap {
    pub objects: Vec<HitObject>,
    pub hp: f64,
    pub cs: f64,
    pub od: f64,
    pub ar: f64,
}

impl Beatmap {
    pub fn new(objects: Vec<HitObject>, hp: f64, cs: f64, od: f64, ar: f64) -> Self {
        Self {
            objects,
            hp,
            cs,
            od,
            ar,
        }
    }

    /// Maximum achievable combo over the whole map.
    pub fn max_combo(&self) -> u32 {
        self.objects.iter().map(|o| o.combo_units()).sum()
    }

    /// End time of the last object, or 0 for an empty map.
    pub fn last_end_time(&self) -> f64 {
        self.objects.last().map(|o| o.end_time()).unwrap_or(0.0)
    }

    /// Start time of the first object, or 0 for an empty map.
    pub fn first_start_time(&self) -> f64 {
        self.objects.first().map(|o| o.start_time).unwrap_or(0.0)
    }

    /// Whether the object at `number` closes its combo group: it is the last
    /// object of the map or the next object starts a new combo.
    pub fn is_combo_group_end(&self, number: usize) -> bool {
        match self.objects.get(number + 1) {
            Some(next) => next.new_combo,
            None => number + 1 == self.objects.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(t: f64) -> HitObject {
        HitObject {
            start_time: t,
            pos: Vector2::new(100.0, 100.0),
            stack_index: 0,
            new_combo: false,
            data: HitObjectData::Circle,
        }
    }

    #[test]
    fn test_max_combo_counts_slider_parts() {
        let slider = HitObject {
            start_time: 0.0,
            pos: Vector2::new(0.0, 0.0),
            stack_index: 0,
            new_combo: true,
            data: HitObjectData::Slider(SliderData {
                checkpoints: vec![
                    PathPoint {
                        time: 100.0,
                        pos: Vector2::new(50.0, 0.0),
                        is_repeat: false,
                    },
                    PathPoint {
                        time: 200.0,
                        pos: Vector2::new(100.0, 0.0),
                        is_repeat: true,
                    },
                ],
                end_pos: Vector2::new(0.0, 0.0),
                end_time: 300.0,
            }),
        };

        let map = Beatmap::new(vec![slider, circle(500.0)], 5.0, 4.0, 7.0, 9.0);
        // head + 2 checkpoints + tail = 4, plus the circle.
        assert_eq!(map.max_combo(), 5);
    }

    #[test]
    fn test_combo_group_end() {
        let mut a = circle(0.0);
        a.new_combo = true;
        let b = circle(100.0);
        let mut c = circle(200.0);
        c.new_combo = true;

        let map = Beatmap::new(vec![a, b, c], 5.0, 4.0, 7.0, 9.0);
        assert!(!map.is_combo_group_end(0));
        assert!(map.is_combo_group_end(1)); // next starts a combo
        assert!(map.is_combo_group_end(2)); // last object
    }
}
