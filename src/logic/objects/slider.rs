//! Slider state machine: clicked head, tracked checkpoints, judged whole.

use crate::logic::objects::{ClickAction, ObjectHandler};
use crate::logic::player::PlayerContext;
use crate::logic::results::{ComboResult, HitResult, JudgementResult};
use crate::models::beatmap::{HitObject, SliderData, Vector2};
use crate::models::mods::Mods;

/// How far ahead an end checkpoint may be judged when the feed is
/// frame-sparse and the lookahead flag is set.
const END_LOOKAHEAD: f64 = 36.0;

#[derive(Debug, Clone, Default)]
struct SliderPlayerState {
    /// Head dealt with (clicked or timed out).
    head_resolved: bool,
    /// Head actually clicked in time.
    head_hit: bool,
    /// Next checkpoint to judge.
    checkpoint_index: usize,
    end_judged: bool,
    /// Final judgement emitted.
    finished: bool,
    points_hit: u32,
}

pub struct SliderObject {
    number: usize,
    start_time: f64,
    pos: Vector2,
    stack_index: i32,
    fade_time: f64,
    data: SliderData,
    state: Vec<SliderPlayerState>,
}

impl SliderObject {
    pub fn new(
        number: usize,
        obj: &HitObject,
        data: SliderData,
        fade_time: f64,
        player_count: usize,
    ) -> Self {
        Self {
            number,
            start_time: obj.start_time,
            pos: obj.pos,
            stack_index: obj.stack_index,
            fade_time,
            data,
            state: vec![SliderPlayerState::default(); player_count],
        }
    }

    /// Head + checkpoints + tail.
    fn total_points(&self) -> u32 {
        2 + self.data.checkpoints.len() as u32
    }

    fn head_pos(&self, player: &PlayerContext) -> Vector2 {
        let off = self.stack_index as f32 * (player.diff.radius / 10.0);
        Vector2::new(self.pos.x - off, self.pos.y - off)
    }

    fn tracking(&self, player: &PlayerContext, at: Vector2) -> bool {
        let held = player.cursor.any_button()
            || player.cursor.is_autoplay
            || player.diff.mods.active(Mods::RELAX);
        held && player.cursor.pos.distance(at) <= player.diff.follow_radius()
    }

    fn miss_head(&mut self, player: &PlayerContext, time: f64, out: &mut Vec<JudgementResult>) {
        out.push(JudgementResult::new(
            self.number,
            time,
            self.head_pos(player),
            HitResult::SliderMiss,
            ComboResult::Reset,
        ));
        let state = &mut self.state[player.index];
        state.head_resolved = true;
        state.head_hit = false;
    }

    /// Judges the whole slider from the fraction of tracked points.
    fn finish(&mut self, player: &PlayerContext, time: f64, out: &mut Vec<JudgementResult>) {
        let total = self.total_points();
        let state = &mut self.state[player.index];

        let result = if state.points_hit == total {
            HitResult::Hit300
        } else if state.points_hit * 2 >= total {
            HitResult::Hit100
        } else if state.points_hit > 0 {
            HitResult::Hit50
        } else {
            HitResult::Miss
        };

        let combo = if result == HitResult::Miss {
            ComboResult::Reset
        } else {
            ComboResult::Hold
        };

        let mut judgement =
            JudgementResult::new(self.number, time, self.data.end_pos, result, combo);
        judgement.slider_head_hit = state.head_hit;
        out.push(judgement);

        state.finished = true;
    }
}

impl ObjectHandler for SliderObject {
    fn update_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        // Relax takes the head for free at its time.
        if !self.state[player.index].head_resolved
            && player.diff.mods.active(Mods::RELAX)
            && time >= self.start_time
            && player.cursor.pos.distance(self.head_pos(player)) <= player.diff.radius
        {
            let state = &mut self.state[player.index];
            state.head_resolved = true;
            state.head_hit = true;
            state.points_hit += 1;
            out.push(JudgementResult::new(
                self.number,
                time,
                self.head_pos(player),
                HitResult::SliderStart,
                ComboResult::Increase,
            ));
        }

        // Tick and repeat checkpoints due by now.
        while self.state[player.index].checkpoint_index < self.data.checkpoints.len() {
            let ci = self.state[player.index].checkpoint_index;
            let cp = self.data.checkpoints[ci];
            if time < cp.time {
                break;
            }

            let tracked = self.tracking(player, cp.pos);
            let state = &mut self.state[player.index];
            state.checkpoint_index += 1;

            if tracked {
                state.points_hit += 1;
                out.push(JudgementResult::new(
                    self.number,
                    cp.time,
                    cp.pos,
                    if cp.is_repeat {
                        HitResult::SliderRepeat
                    } else {
                        HitResult::SliderPoint
                    },
                    ComboResult::Increase,
                ));
            } else {
                out.push(JudgementResult::new(
                    self.number,
                    cp.time,
                    cp.pos,
                    HitResult::SliderMiss,
                    ComboResult::Reset,
                ));
            }
        }

        // Tail checkpoint, optionally judged a little early for sparse feeds.
        let end_check = if lookahead {
            self.data.end_time - END_LOOKAHEAD
        } else {
            self.data.end_time
        };

        if !self.state[player.index].end_judged && time >= end_check {
            // Once the slider is over the head can no longer be clicked.
            if !self.state[player.index].head_resolved {
                self.miss_head(player, time, out);
            }

            let tracked = self.tracking(player, self.data.end_pos);
            let state = &mut self.state[player.index];
            state.end_judged = true;

            if tracked {
                state.points_hit += 1;
                out.push(JudgementResult::new(
                    self.number,
                    self.data.end_time,
                    self.data.end_pos,
                    HitResult::SliderEnd,
                    ComboResult::Increase,
                ));
            } else {
                // Dropped ends never reset combo.
                out.push(JudgementResult::new(
                    self.number,
                    self.data.end_time,
                    self.data.end_pos,
                    HitResult::Ignore,
                    ComboResult::Hold,
                ));
            }

            self.finish(player, self.data.end_time, out);
        }

        !self.state[player.index].finished
    }

    fn update_click_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        action: ClickAction,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        if !self.state[player.index].head_resolved && player.clicked() {
            let in_radius =
                player.cursor.pos.distance(self.head_pos(player)) <= player.diff.radius;

            if in_radius && action == ClickAction::Click {
                player.consume_click();

                match player.diff.judge_delta(time - self.start_time) {
                    Some(HitResult::Miss) => {
                        // Inside the hittable range but outside the 50
                        // window: slider break on the head.
                        self.miss_head(player, time, out);
                    }
                    Some(_) => {
                        let pos = self.head_pos(player);
                        let state = &mut self.state[player.index];
                        state.head_resolved = true;
                        state.head_hit = true;
                        state.points_hit += 1;
                        out.push(JudgementResult::new(
                            self.number,
                            time,
                            pos,
                            HitResult::SliderStart,
                            ComboResult::Increase,
                        ));
                    }
                    None => {}
                }
            }
        }

        !self.state[player.index].finished
    }

    fn update_post_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        _lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        if !self.state[player.index].head_resolved && time > self.start_time + player.diff.hit50 {
            self.miss_head(player, time, out);
        }

        !self.state[player.index].finished
    }

    fn update_post(&mut self, _time: f64) -> bool {
        self.state.iter().all(|s| s.finished)
    }

    fn is_resolved_for(&self, player_index: usize) -> bool {
        self.state[player_index].head_resolved
    }

    fn fade_time(&self) -> f64 {
        self.fade_time
    }

    fn number(&self) -> usize {
        self.number
    }
}
