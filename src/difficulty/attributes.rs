//! Precomputed difficulty attributes consumed by the performance valuator.

/// Difficulty snapshot after a given number of judged objects.
///
/// One entry per object; the array is computed once per difficulty-mod mask
/// before simulation starts and shared read-only between cursors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attributes {
    /// Aim skill rating (stars).
    pub aim: f64,
    /// Tapping speed skill rating (stars).
    pub speed: f64,
    /// Flashlight skill rating; 0 unless FL is in the mask.
    pub flashlight: f64,
    /// Share of aim difficulty that remains when sliders are played lazily.
    pub slider_factor: f64,
    /// Weighted count of speed-relevant notes.
    pub speed_note_count: f64,

    pub circles: u32,
    pub sliders: u32,
    pub spinners: u32,
    /// Objects included in this snapshot.
    pub object_count: u32,
    /// Maximum combo achievable over these objects.
    pub max_combo: u32,
}
