pub mod health;
pub mod objects;
pub mod player;
pub mod results;
pub mod ruleset;
pub mod scoring;

pub use health::HealthProcessor;
pub use objects::{ClickAction, GameObject, ObjectHandler};
pub use player::PlayerContext;
pub use results::{BonusAddition, ComboResult, HitResult, JudgementResult};
pub use ruleset::Ruleset;
pub use scoring::ScoreProcessor;
