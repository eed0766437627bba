//! rjudge — an osu!-style judgement, scoring and performance engine.
//!
//! The crate simulates a beatmap against one or more cursors (live input,
//! replay, autoplay) and produces judged outcomes: hit classification,
//! running score, combo, health, grade and a live performance value.
//!
//! Rendering, audio, beatmap parsing and replay decoding are external; the
//! engine consumes already-parsed [`models::Beatmap`] data and per-frame
//! cursor state, and emits results through listeners and [`models::Score`]
//! snapshots. See [`logic::Ruleset`] for the driving protocol.

pub mod difficulty;
pub mod logic;
pub mod models;

pub use logic::ruleset::Ruleset;
pub use logic::results::{BonusAddition, ComboResult, HitResult, JudgementResult};
pub use models::{Beatmap, CursorState, GameplayConfig, Grade, Mods, Score};
