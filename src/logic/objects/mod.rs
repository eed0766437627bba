//! Object state machines and the contract the orchestrator drives them with.

pub mod circle;
pub mod slider;
pub mod spinner;

pub use circle::CircleObject;
pub use slider::SliderObject;
pub use spinner::SpinnerObject;

use crate::logic::player::PlayerContext;
use crate::logic::results::JudgementResult;
use crate::models::beatmap::{HitObject, HitObjectData};

/// Orchestrator's answer to "may this click go to this object?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Drop silently (stacked-object suppression).
    Ignored,
    /// Reject; renderers show shake feedback.
    Shake,
    /// Accept.
    Click,
}

/// Contract every object kind implements. Methods push judgements into `out`;
/// the orchestrator drains and applies them after each call, so an object
/// never mutates scoring state directly.
pub trait ObjectHandler {
    /// Movement pass. Returns whether the object still wants updates for
    /// this cursor.
    fn update_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool;

    /// Click pass; `action` is the orchestrator's eligibility decision.
    fn update_click_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        action: ClickAction,
        out: &mut Vec<JudgementResult>,
    ) -> bool;

    /// Late pass: timeouts and end-of-window judgements.
    fn update_post_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool;

    /// Global late pass. Returns true once the object is fully resolved for
    /// everyone and can leave the active set.
    fn update_post(&mut self, time: f64) -> bool;

    /// Whether this cursor is done with the object (judged or timed out).
    fn is_resolved_for(&self, player_index: usize) -> bool;

    /// Time at which the object becomes visible and joins the active set.
    fn fade_time(&self) -> f64;

    /// Ordinal index in the beatmap.
    fn number(&self) -> usize;
}

/// Closed set of gameplay objects. Constructed once per beatmap object,
/// selected by kind; dispatch is a plain match.
pub enum GameObject {
    Circle(CircleObject),
    Slider(SliderObject),
    Spinner(SpinnerObject),
}

impl GameObject {
    /// Builds the state machine for one beatmap object.
    ///
    /// `fade_time` is precomputed by the orchestrator from the widest preempt
    /// among participating cursors.
    pub fn from_hit_object(
        number: usize,
        obj: &HitObject,
        fade_time: f64,
        player_count: usize,
    ) -> Self {
        match &obj.data {
            HitObjectData::Circle => {
                GameObject::Circle(CircleObject::new(number, obj, fade_time, player_count))
            }
            HitObjectData::Slider(data) => GameObject::Slider(SliderObject::new(
                number,
                obj,
                data.clone(),
                fade_time,
                player_count,
            )),
            HitObjectData::Spinner(data) => {
                GameObject::Spinner(SpinnerObject::new(number, obj, *data, fade_time, player_count))
            }
        }
    }

    pub fn is_slider(&self) -> bool {
        matches!(self, GameObject::Slider(_))
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, GameObject::Circle(_))
    }

    fn inner(&self) -> &dyn ObjectHandler {
        match self {
            GameObject::Circle(c) => c,
            GameObject::Slider(s) => s,
            GameObject::Spinner(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ObjectHandler {
        match self {
            GameObject::Circle(c) => c,
            GameObject::Slider(s) => s,
            GameObject::Spinner(s) => s,
        }
    }
}

impl ObjectHandler for GameObject {
    fn update_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        self.inner_mut().update_for(player, time, lookahead, out)
    }

    fn update_click_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        action: ClickAction,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        self.inner_mut().update_click_for(player, time, action, out)
    }

    fn update_post_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        self.inner_mut().update_post_for(player, time, lookahead, out)
    }

    fn update_post(&mut self, time: f64) -> bool {
        self.inner_mut().update_post(time)
    }

    fn is_resolved_for(&self, player_index: usize) -> bool {
        self.inner().is_resolved_for(player_index)
    }

    fn fade_time(&self) -> f64 {
        self.inner().fade_time()
    }

    fn number(&self) -> usize {
        self.inner().number()
    }
}
