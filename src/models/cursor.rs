//! Cursor feed state: where the cursor is, what it presses, who drives it.

use crate::models::beatmap::Vector2;

/// One participating cursor, fed each tick by the caller (live input, a
/// replay reader, or an autoplay synthesizer).
#[derive(Debug, Clone)]
pub struct CursorState {
    pub name: String,
    pub pos: Vector2,
    pub left_button: bool,
    pub right_button: bool,

    /// Feed is a recorded replay.
    pub is_replay: bool,
    /// Feed is synthesized autoplay.
    pub is_autoplay: bool,
    /// Feed is a live human player.
    pub is_player: bool,
    /// Use the legacy spinner scoring curve.
    pub old_spinner_scoring: bool,
}

impl CursorState {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pos: Vector2::default(),
            left_button: false,
            right_button: false,
            is_replay: false,
            is_autoplay: false,
            is_player: false,
            old_spinner_scoring: false,
        }
    }

    pub fn player(name: &str) -> Self {
        Self {
            is_player: true,
            ..Self::new(name)
        }
    }

    pub fn replay(name: &str) -> Self {
        Self {
            is_replay: true,
            ..Self::new(name)
        }
    }

    pub fn autoplay(name: &str) -> Self {
        Self {
            is_autoplay: true,
            ..Self::new(name)
        }
    }

    /// Replay and live feeds carry authoritative frame-accurate button data;
    /// synthesized feeds do not.
    pub fn is_authoritative(&self) -> bool {
        self.is_replay || self.is_player
    }

    pub fn any_button(&self) -> bool {
        self.left_button || self.right_button
    }
}
