//! Per-cursor simulation context: rule values plus the button latch.

use crate::models::cursor::CursorState;
use crate::models::difficulty::Difficulty;

/// Mouse button bitmask for the click history latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons(pub u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const LEFT: Buttons = Buttons(1);
    pub const RIGHT: Buttons = Buttons(1 << 1);

    pub fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 == other.0
    }
}

/// One cursor's view of the simulation: its feed, its difficulty values and
/// the button-edge bookkeeping the click pass maintains.
#[derive(Debug, Clone)]
pub struct PlayerContext {
    pub index: usize,
    pub cursor: CursorState,
    pub diff: Difficulty,

    /// Committed button state (end of the previous click pass).
    pub buttons_left: bool,
    pub buttons_right: bool,

    /// Just-pressed edges for this tick.
    pub left_cond: bool,
    pub right_cond: bool,
    /// Consumable copies of the edges; an object that accepts a click takes
    /// one so later objects don't see it again.
    pub left_cond_e: bool,
    pub right_cond_e: bool,

    pub game_down_state: bool,
    pub mouse_down_button: Buttons,
    pub last_button: Buttons,
    pub last_button2: Buttons,
    /// Both edges arrived in the same frame.
    pub double_click: bool,
}

impl PlayerContext {
    pub fn new(index: usize, cursor: CursorState, diff: Difficulty) -> Self {
        Self {
            index,
            cursor,
            diff,
            buttons_left: false,
            buttons_right: false,
            left_cond: false,
            right_cond: false,
            left_cond_e: false,
            right_cond_e: false,
            game_down_state: false,
            mouse_down_button: Buttons::NONE,
            last_button: Buttons::NONE,
            last_button2: Buttons::NONE,
            double_click: false,
        }
    }

    /// Detects button-down edges against the committed state. Run at the top
    /// of the click pass, before any object sees the click.
    pub fn latch_clicks(&mut self) {
        self.left_cond = !self.buttons_left && self.cursor.left_button;
        self.right_cond = !self.buttons_right && self.cursor.right_button;

        self.left_cond_e = self.left_cond;
        self.right_cond_e = self.right_cond;

        if self.buttons_left != self.cursor.left_button
            || self.buttons_right != self.cursor.right_button
        {
            self.game_down_state = self.cursor.left_button || self.cursor.right_button;

            self.last_button2 = self.last_button;
            self.last_button = self.mouse_down_button;

            let mut down = Buttons::NONE;
            if self.cursor.left_button {
                down.0 |= Buttons::LEFT.0;
            }
            if self.cursor.right_button {
                down.0 |= Buttons::RIGHT.0;
            }
            self.mouse_down_button = down;

            self.double_click = self.left_cond && self.right_cond;
        }
    }

    /// Commits the raw button state. Run after every active object had its
    /// chance to consume the edge.
    pub fn commit_buttons(&mut self) {
        self.buttons_left = self.cursor.left_button;
        self.buttons_right = self.cursor.right_button;
    }

    /// An unconsumed click edge is available.
    pub fn clicked(&self) -> bool {
        self.left_cond_e || self.right_cond_e
    }

    /// Takes one click edge; returns false if none was left.
    pub fn consume_click(&mut self) -> bool {
        if self.left_cond_e {
            self.left_cond_e = false;
            true
        } else if self.right_cond_e {
            self.right_cond_e = false;
            true
        } else {
            false
        }
    }
}
