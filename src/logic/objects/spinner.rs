//! Spinner state machine: accumulate rotations, judge the ratio at the end.

use crate::logic::objects::{ClickAction, ObjectHandler};
use crate::logic::player::PlayerContext;
use crate::logic::results::{ComboResult, HitResult, JudgementResult};
use crate::models::beatmap::{HitObject, SpinnerData, Vector2};
use crate::models::difficulty::Difficulty;
use crate::models::mods::Mods;

/// Auto-spin rate (RX/SO/autoplay), rotations per millisecond. 477 rpm.
const AUTO_SPIN_RATE: f64 = 477.0 / 60_000.0;

#[derive(Debug, Clone, Default)]
struct SpinnerPlayerState {
    rotations: f64,
    last_angle: Option<f64>,
    last_time: Option<f64>,
    spins_awarded: u32,
    finished: bool,
}

pub struct SpinnerObject {
    number: usize,
    start_time: f64,
    end_time: f64,
    pos: Vector2,
    fade_time: f64,
    state: Vec<SpinnerPlayerState>,
}

impl SpinnerObject {
    pub fn new(
        number: usize,
        obj: &HitObject,
        data: SpinnerData,
        fade_time: f64,
        player_count: usize,
    ) -> Self {
        Self {
            number,
            start_time: obj.start_time,
            end_time: data.end_time,
            pos: obj.pos,
            fade_time,
            state: vec![SpinnerPlayerState::default(); player_count],
        }
    }

    /// Rotations needed to clear, scaled down the way stable scales its
    /// theoretical spin rate.
    fn required_spins(&self, diff: &Difficulty) -> u32 {
        let od = diff.od;
        let rps = if od <= 5.0 {
            1.5 + 1.0 * od / 5.0
        } else {
            2.5 + 1.25 * (od - 5.0) / 5.0
        };

        let duration = (self.end_time - self.start_time).max(0.0);
        ((duration / 1000.0 * rps * 0.6).floor() as u32).max(1)
    }

    fn spins_automatically(&self, player: &PlayerContext) -> bool {
        player.cursor.is_autoplay
            || player
                .diff
                .mods
                .active(Mods::RELAX | Mods::SPUN_OUT | Mods::AUTOPILOT)
    }
}

impl ObjectHandler for SpinnerObject {
    fn update_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        _lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        let required = self.required_spins(&player.diff);
        let auto = self.spins_automatically(player);
        let state = &mut self.state[player.index];

        if !state.finished && time >= self.start_time {
            let clamped = time.min(self.end_time);

            if auto {
                let last = state.last_time.unwrap_or(self.start_time);
                if clamped > last {
                    state.rotations += (clamped - last) * AUTO_SPIN_RATE;
                }
                state.last_time = Some(clamped);
            } else if player.cursor.any_button() {
                let angle = f64::from(self.pos.angle_to(player.cursor.pos));
                if let Some(last) = state.last_angle {
                    let mut delta = angle - last;
                    if delta > std::f64::consts::PI {
                        delta -= std::f64::consts::TAU;
                    } else if delta < -std::f64::consts::PI {
                        delta += std::f64::consts::TAU;
                    }
                    state.rotations += delta.abs() / std::f64::consts::TAU;
                }
                state.last_angle = Some(angle);
            } else {
                state.last_angle = None;
            }

            // Award completed rotations; spins past the requirement pay out
            // as bonus.
            while state.spins_awarded < state.rotations.floor() as u32 {
                state.spins_awarded += 1;
                let result = if state.spins_awarded <= required {
                    HitResult::SpinnerSpin
                } else {
                    HitResult::SpinnerBonus
                };
                out.push(JudgementResult::new(
                    self.number,
                    time,
                    self.pos,
                    result,
                    ComboResult::Hold,
                ));
            }
        }

        !state.finished
    }

    fn update_click_for(
        &mut self,
        _player: &mut PlayerContext,
        _time: f64,
        _action: ClickAction,
        _out: &mut Vec<JudgementResult>,
    ) -> bool {
        // Spinners consume held buttons, never click edges.
        !self.state.iter().all(|s| s.finished)
    }

    fn update_post_for(
        &mut self,
        player: &mut PlayerContext,
        time: f64,
        _lookahead: bool,
        out: &mut Vec<JudgementResult>,
    ) -> bool {
        let required = self.required_spins(&player.diff);
        let state = &mut self.state[player.index];

        if !state.finished && time >= self.end_time {
            let ratio = state.rotations / f64::from(required);

            let result = if ratio >= 1.0 {
                HitResult::Hit300
            } else if ratio >= 0.9 {
                HitResult::Hit100
            } else if ratio >= 0.75 {
                HitResult::Hit50
            } else {
                HitResult::Miss
            };

            let combo = if result == HitResult::Miss {
                ComboResult::Reset
            } else {
                ComboResult::Increase
            };

            out.push(JudgementResult::new(
                self.number,
                self.end_time,
                self.pos,
                result,
                combo,
            ));
            state.finished = true;
        }

        !state.finished
    }

    fn update_post(&mut self, _time: f64) -> bool {
        self.state.iter().all(|s| s.finished)
    }

    fn is_resolved_for(&self, player_index: usize) -> bool {
        self.state[player_index].finished
    }

    fn fade_time(&self) -> f64 {
        self.fade_time
    }

    fn number(&self) -> usize {
        self.number
    }
}
