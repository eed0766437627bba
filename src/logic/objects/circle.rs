//! Hit circle state machine: one click, judged by timing delta.

use crate::logic::objects::{ClickAction, ObjectHandler};
use crate::logic::player::PlayerContext;
use crate::logic::results::{ComboResult, HitResult, JudgementResult};
use crate::models::beatmap::{HitObject, Vector2};
use crate::models::mods::Mods;

pub struct CircleObject {
    number: usize,
    start_time: f64,
    pos: Vector2,
    stack_index: i32,
    fade_time: f64,
    /// Per-player: judged (hit or missed).
    hit: Vec<bool>,
}

impl CircleObject {
    pub fn new(number: usize, obj: &HitObject, fade_time: f64, player_count: usize) -> Self {
        Self {
            number,
            start_time: obj.start_time,
            pos: obj.pos,
            stack_index: obj.stack_index,
            fade_time,
            hit: vec![false; player_count],
        }
    }

    fn stacked_pos(&self, player: &PlayerContext) -> Vector2 {
        let off = self.stack_index as f32 * (player.diff.radius / 10.0);
        Vector2::new(self.pos.x - off, self.pos.y - off)
    }

    fn judge(&mut self, player: &PlayerContext, time: f64, out: &mut Vec<JudgementResult>) {
        if let Some(result) = player.diff.judge_delta(time - self.start_time) {
            let combo = if result == HitResult::Miss {
                ComboResult::Reset
            } else {
                ComboResult::Increase
            };

            out.push(JudgementResult::new(
                self.number,
                time,
                self.stacked_pos(player),
                result,
                combo,
            ));
            self.hit[player.index] = true;
        }
    }
}

impl ObjectHandler for CircleObject {
    fn update_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        _lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        // Relax hits automatically once the cursor hovers the circle at its
        // time; no button involved.
        if !self.hit[player.index]
            && player.diff.mods.active(Mods::RELAX)
            && time >= self.start_time
        {
            let in_radius =
                player.cursor.pos.distance(self.stacked_pos(player)) <= player.diff.radius;
            if in_radius {
                self.judge(player, time, out);
            }
        }

        !self.hit[player.index]
    }

    fn update_click_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        action: ClickAction,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        if !self.hit[player.index] && player.clicked() {
            let in_radius =
                player.cursor.pos.distance(self.stacked_pos(player)) <= player.diff.radius;

            if in_radius {
                match action {
                    ClickAction::Click => {
                        player.consume_click();
                        self.judge(player, time, out);
                    }
                    // Shake feedback is a render concern; nothing to score.
                    ClickAction::Shake | ClickAction::Ignored => {}
                }
            } else if action == ClickAction::Click {
                out.push(JudgementResult::new(
                    self.number,
                    time,
                    player.cursor.pos,
                    HitResult::PositionalMiss,
                    ComboResult::Hold,
                ));
            }
        }

        !self.hit[player.index]
    }

    fn update_post_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        _lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        if !self.hit[player.index] && time > self.start_time + player.diff.hit50 {
            out.push(JudgementResult::new(
                self.number,
                time,
                self.stacked_pos(player),
                HitResult::Miss,
                ComboResult::Reset,
            ));
            self.hit[player.index] = true;
        }

        !self.hit[player.index]
    }

    fn update_post(&mut self, _time: f64) -> bool {
        self.hit.iter().all(|h| *h)
    }

    fn is_resolved_for(&self, player_index: usize) -> bool {
        self.hit[player_index]
    }

    fn fade_time(&self) -> f64 {
        self.fade_time
    }

    fn number(&self) -> usize {
        self.number
    }
}
