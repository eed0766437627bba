pub mod beatmap;
pub mod cursor;
pub mod difficulty;
pub mod mods;
pub mod score;
pub mod settings;

pub use beatmap::{Beatmap, HitObject, HitObjectData, PathPoint, SliderData, SpinnerData, Vector2};
pub use cursor::CursorState;
pub use difficulty::Difficulty;
pub use mods::Mods;
pub use score::{Grade, Score};
pub use settings::GameplayConfig;
