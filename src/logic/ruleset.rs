//! Judgement orchestrator: advances object state machines in time order,
//! routes clicks and movement, applies results to score/health/performance,
//! and produces the final ranking.
//!
//! Driving protocol, per frame with nondecreasing `time`: for every cursor
//! call `update_click_for`, then `update_normal_for`, then `update_post_for`;
//! finish the frame with `update`. Listener callbacks run synchronously and
//! must not call back into the ruleset.

use crate::difficulty::attributes::Attributes;
use crate::difficulty::calculator::calculate_step;
use crate::difficulty::performance::{PerfScore, Performance};
use crate::logic::health::HealthProcessor;
use crate::logic::objects::{ClickAction, GameObject, ObjectHandler};
use crate::logic::player::PlayerContext;
use crate::logic::results::{BonusAddition, ComboResult, HitResult, JudgementResult};
use crate::logic::scoring::{processor_for, ScoreProcessor};
use crate::models::beatmap::Beatmap;
use crate::models::cursor::CursorState;
use crate::models::difficulty::Difficulty;
use crate::models::mods::Mods;
use crate::models::score::Score;
use crate::models::settings::GameplayConfig;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};

/// Slack (ms) between an unresolved earlier object's end and a later object's
/// start before a click on the later one is rejected as stale.
const TOLERANCE_2B: f64 = 3.0;

pub type HitListener = Box<dyn FnMut(usize, &JudgementResult, &Score)>;
pub type EndListener = Box<dyn FnMut(f64, usize)>;
pub type FailListener = Box<dyn FnMut(usize)>;

/// Per-cursor mutable session state.
struct SubSet {
    score: Score,
    hp: HealthProcessor,
    processor: Box<dyn ScoreProcessor>,
    raw_score: i64,
    /// Judged objects so far (base results only).
    num_objects: u32,
    /// 100s inside the current combo group.
    current_katu: u32,
    /// 50s and misses inside the current combo group.
    current_bad: u32,
    /// Extra lives granted by Easy.
    recoveries: u32,
    failed: bool,
    /// Fail forced by a strict-fail mod this judgement.
    sdpf_fail: bool,
    /// Fail forced by early termination.
    force_fail: bool,
}

pub struct Ruleset {
    beatmap: Beatmap,
    config: GameplayConfig,

    players: Vec<PlayerContext>,
    subsets: Vec<SubSet>,

    objects: Vec<GameObject>,
    /// Object numbers not yet visible, in map order.
    pending: VecDeque<usize>,
    /// Object numbers visible and not yet fully resolved.
    processed: Vec<usize>,

    /// One attribute array per difficulty-mod mask, shared between cursors.
    attribs: HashMap<Mods, Vec<Attributes>>,

    ended: bool,

    hit_listener: Option<HitListener>,
    end_listener: Option<EndListener>,
    fail_listener: Option<FailListener>,
}

impl Ruleset {
    pub fn new(
        beatmap: Beatmap,
        config: GameplayConfig,
        cursors: Vec<CursorState>,
        mods: Vec<Mods>,
    ) -> Self {
        assert_eq!(cursors.len(), mods.len(), "one modifier set per cursor");

        log::info!("RULESET: Creating ruleset ({} cursors)...", cursors.len());

        let mut players = Vec::with_capacity(cursors.len());
        let mut subsets = Vec::with_capacity(cursors.len());
        let mut attribs: HashMap<Mods, Vec<Attributes>> = HashMap::new();

        for (i, (cursor, m)) in cursors.into_iter().zip(mods).enumerate() {
            let diff = Difficulty::new(beatmap.hp, beatmap.cs, beatmap.od, beatmap.ar, m);

            let mask = m.diff_mask();
            if !attribs.contains_key(&mask) {
                let step = calculate_step(&beatmap, &diff);

                if let Some(last) = step.last() {
                    log::info!("RULESET: Stars for {}:", mask);
                    log::info!("RULESET: \tAim:   {:.2}", last.aim);
                    log::info!("RULESET: \tSpeed: {:.2}", last.speed);

                    let ss = Performance::new(
                        *last,
                        PerfScore {
                            max_combo: last.max_combo,
                            count_great: last.object_count,
                            ..Default::default()
                        },
                        &diff,
                    )
                    .calculate();
                    log::info!("RULESET: SS pp: {:.2}", ss.total);
                }

                attribs.insert(mask, step);
            }

            let hp = HealthProcessor::new(&beatmap, &diff);

            let recoveries = if m.active(Mods::EASY) { 2 } else { 0 };

            let mut processor = processor_for(m);
            processor.init(&beatmap, &diff);

            players.push(PlayerContext::new(i, cursor, diff));
            subsets.push(SubSet {
                score: Score::new(),
                hp,
                processor,
                raw_score: 0,
                num_objects: 0,
                current_katu: 0,
                current_bad: 0,
                recoveries,
                failed: false,
                sdpf_fail: false,
                force_fail: false,
            });
        }

        // Objects become active a full preempt before their time; with mixed
        // per-cursor AR the widest preempt wins.
        let max_preempt = players
            .iter()
            .map(|p| OrderedFloat(p.diff.preempt))
            .max()
            .map(|p| p.0)
            .unwrap_or(1200.0);

        let objects: Vec<GameObject> = beatmap
            .objects
            .iter()
            .enumerate()
            .map(|(n, obj)| {
                GameObject::from_hit_object(n, obj, obj.start_time - max_preempt, players.len())
            })
            .collect();

        let pending = (0..objects.len()).collect();

        Self {
            beatmap,
            config,
            players,
            subsets,
            objects,
            pending,
            processed: Vec::new(),
            attribs,
            ended: false,
            hit_listener: None,
            end_listener: None,
            fail_listener: None,
        }
    }

    /// Global frame pass: resolve finished objects, activate due ones, tick
    /// health, close the run when everything is done.
    pub fn update(&mut self, time: f64) {
        let mut i = 0;
        while i < self.processed.len() {
            let idx = self.processed[i];
            if self.objects[idx].update_post(time) {
                let number = self.objects[idx].number();
                if let Some(cb) = self.end_listener.as_mut() {
                    cb(time, number);
                }
                self.processed.remove(i);
            } else {
                i += 1;
            }
        }

        while let Some(&front) = self.pending.front() {
            if self.objects[front].fade_time() > time {
                break;
            }
            self.pending.pop_front();
            self.processed.push(front);
        }

        for i in 0..self.subsets.len() {
            self.subsets[i].hp.update(time);
            if self.subsets[i].hp.take_fail_signal() {
                self.fail_internal(i);
            }
        }

        if self.pending.is_empty() && self.processed.is_empty() && !self.ended {
            self.ended = true;
            self.log_ranking();
        }
    }

    /// Click pass for one cursor. Button state is committed only after every
    /// active object saw the edge.
    pub fn update_click_for(&mut self, cursor: usize, time: f64) {
        self.players[cursor].latch_clicks();

        if !self.subsets[cursor].failed {
            let mut results = Vec::new();

            for i in 0..self.processed.len() {
                let idx = self.processed[i];
                let action = self.can_be_hit(time, idx, cursor);

                self.objects[idx].update_click_for(
                    &mut self.players[cursor],
                    time,
                    action,
                    &mut results,
                );

                for judgement in results.drain(..) {
                    self.send_result(cursor, judgement);
                }
            }
        }

        self.players[cursor].commit_buttons();
    }

    /// Movement pass for one cursor. Non-authoritative feeds only advance one
    /// unresolved slider at a time to avoid double counting sparse frames.
    pub fn update_normal_for(&mut self, cursor: usize, time: f64, lookahead: bool) {
        let mut was_slider_already = false;
        let mut results = Vec::new();

        for i in 0..self.processed.len() {
            let idx = self.processed[i];

            if !self.players[cursor].cursor.is_authoritative() && self.objects[idx].is_slider() {
                if was_slider_already {
                    continue;
                }
                if !self.objects[idx].is_resolved_for(cursor) {
                    was_slider_already = true;
                }
            }

            self.objects[idx].update_for(&mut self.players[cursor], time, lookahead, &mut results);

            for judgement in results.drain(..) {
                self.send_result(cursor, judgement);
            }
        }
    }

    /// Late pass for one cursor: timeouts and end-of-window judgements.
    pub fn update_post_for(&mut self, cursor: usize, time: f64, lookahead: bool) {
        let mut results = Vec::new();

        for i in 0..self.processed.len() {
            let idx = self.processed[i];

            self.objects[idx].update_post_for(
                &mut self.players[cursor],
                time,
                lookahead,
                &mut results,
            );

            for judgement in results.drain(..) {
                self.send_result(cursor, judgement);
            }
        }
    }

    /// Click-eligibility decision for a click aimed at `number`.
    fn can_be_hit(&self, time: f64, number: usize, cursor: usize) -> ClickAction {
        let player = &self.players[cursor];

        if !player.cursor.is_authoritative() {
            if self.objects[number].is_circle() {
                // Don't shake stacks: a click on a circle buried under an
                // earlier unresolved stacked object is dropped silently.
                if let Some(pi) = self.processed.iter().position(|&x| x == number) {
                    if pi > 0 {
                        let prev = self.processed[pi - 1];
                        if self.beatmap.objects[prev].stack_index > 0
                            && !self.objects[prev].is_resolved_for(cursor)
                        {
                            return ClickAction::Ignored;
                        }
                    }
                }
            }

            for &g in &self.processed {
                if !self.objects[g].is_resolved_for(cursor) {
                    if g != number {
                        if self.beatmap.objects[g].end_time() + TOLERANCE_2B
                            < self.beatmap.objects[number].start_time
                        {
                            return ClickAction::Shake;
                        }
                    } else {
                        break;
                    }
                }
            }
        } else {
            // Humans and replays may not hit a circle while the previous
            // circle is unresolved and still in the future.
            let mut last: Option<usize> = None;
            for &g in &self.processed {
                let obj = &self.beatmap.objects[g];
                if obj.data.is_circle()
                    && obj.start_time < self.beatmap.objects[number].start_time
                {
                    last = Some(g);
                }
            }

            if let Some(l) = last {
                if !self.objects[l].is_resolved_for(cursor)
                    && time < self.beatmap.objects[l].start_time
                {
                    return ClickAction::Shake;
                }
            }
        }

        let delta = time - self.beatmap.objects[number].start_time;
        if delta.abs() >= player.diff.hittable_range() {
            return ClickAction::Shake;
        }

        ClickAction::Click
    }

    /// Applies one judgement to the cursor's scoring state, in the fixed
    /// order: downgrade, score, counts, grade, pp, bonus awards, health,
    /// listeners.
    fn send_result(&mut self, cursor: usize, mut judgement: JudgementResult) {
        if judgement.hit_result.is_ignorable() {
            if judgement.hit_result == HitResult::PositionalMiss
                && !self.players[cursor].diff.mods.active(Mods::RELAX)
            {
                let snapshot = self.subsets[cursor].score.clone();
                if let Some(cb) = self.hit_listener.as_mut() {
                    cb(cursor, &judgement, &snapshot);
                }
            }
            return;
        }

        let mods = self.players[cursor].diff.mods;

        // Strict-fail mods turn any break (or, under PF, any imperfect base
        // hit) into a full miss plus a forced reset.
        if (mods.active(Mods::SUDDEN_DEATH | Mods::PERFECT)
            && judgement.combo_result == ComboResult::Reset)
            || (mods.active(Mods::PERFECT)
                && judgement.hit_result.is_base()
                && judgement.hit_result != HitResult::Hit300)
        {
            if judgement.hit_result.is_base() {
                judgement.hit_result = HitResult::Miss;
            } else if matches!(
                judgement.hit_result,
                HitResult::SliderStart
                    | HitResult::SliderPoint
                    | HitResult::SliderRepeat
                    | HitResult::SliderEnd
            ) {
                judgement.hit_result = HitResult::SliderMiss;
            }
            judgement.combo_result = ComboResult::Reset;
            self.subsets[cursor].sdpf_fail = true;
        }

        judgement.hit_result = self.subsets[cursor]
            .processor
            .modify_result(judgement.hit_result, &judgement);

        {
            let subset = &mut self.subsets[cursor];

            subset
                .processor
                .add_result(judgement.hit_result, judgement.combo_result);
            subset.score.score = subset.processor.score();

            // Combo breaks that aren't counted misses are slider breaks.
            if judgement.combo_result == ComboResult::Reset
                && judgement.hit_result != HitResult::Miss
            {
                subset.score.count_slider_breaks += 1;
            }

            if judgement.hit_result.is_base() {
                subset.raw_score += judgement.hit_result.score_value();

                match judgement.hit_result {
                    HitResult::Hit300 => subset.score.count300 += 1,
                    HitResult::Hit100 => subset.score.count100 += 1,
                    HitResult::Hit50 => subset.score.count50 += 1,
                    HitResult::Miss => subset.score.count_miss += 1,
                    _ => {}
                }

                subset.num_objects += 1;
            }

            subset.score.combo = subset.processor.combo().max(subset.score.combo);

            subset.score.accuracy = if subset.num_objects == 0 {
                100.0
            } else {
                100.0 * subset.raw_score as f64 / f64::from(subset.num_objects * 300)
            };

            subset.score.update_grade(mods);
        }

        // Re-derive pp from the attribute entry at the new judged count; the
        // combination formula is not associative, so no patching.
        let index = (self.subsets[cursor].num_objects.max(1) - 1) as usize;
        if let Some(attr) = self
            .attribs
            .get(&mods.diff_mask())
            .and_then(|a| a.get(index))
        {
            let attr = *attr;
            let subset = &mut self.subsets[cursor];

            subset.score.perfect_combo = attr.max_combo == subset.score.combo;

            let perf = PerfScore {
                max_combo: subset.score.combo,
                count_great: subset.score.count300,
                count_ok: subset.score.count100,
                count_meh: subset.score.count50,
                count_miss: subset.score.count_miss,
            };

            subset.score.pp = Performance::new(attr, perf, &self.players[cursor].diff).calculate();
        }

        match judgement.hit_result {
            HitResult::Hit100 => self.subsets[cursor].current_katu += 1,
            HitResult::Hit50 | HitResult::Miss => self.subsets[cursor].current_bad += 1,
            _ => {}
        }

        // Katu/geki are decided at the last object of a combo group, looking
        // back over the group's resolution state.
        if judgement.hit_result.is_base() && self.beatmap.is_combo_group_end(judgement.number) {
            let mut all_clicked = true;
            for n in (0..judgement.number).rev() {
                if !self.objects[n].is_resolved_for(cursor) {
                    all_clicked = false;
                    break;
                }
                if self.beatmap.objects[n].new_combo {
                    break;
                }
            }

            let subset = &mut self.subsets[cursor];
            if judgement.hit_result != HitResult::Miss {
                if subset.current_katu == 0 && subset.current_bad == 0 && all_clicked {
                    judgement.bonus = BonusAddition::Geki;
                    subset.score.count_geki += 1;
                } else if subset.current_bad == 0 && all_clicked {
                    judgement.bonus = BonusAddition::Katu;
                    subset.score.count_katu += 1;
                } else {
                    judgement.bonus = BonusAddition::Mu;
                }
            }

            subset.current_bad = 0;
            subset.current_katu = 0;
        }

        {
            let subset = &mut self.subsets[cursor];
            if subset.sdpf_fail {
                subset.hp.increase(-100_000.0, true);
            } else {
                subset.hp.add_result(judgement.hit_result);
            }
        }
        if self.subsets[cursor].hp.take_fail_signal() {
            self.fail_internal(cursor);
        }

        let snapshot = self.subsets[cursor].score.clone();
        if let Some(cb) = self.hit_listener.as_mut() {
            cb(cursor, &judgement, &snapshot);
        }

        if self.players.len() == 1 && self.config.log_every_hit {
            log::debug!(
                "RULESET: got {:3}, combo: {:4}, score: {:9}, acc: {:6.2}%, 300: {:4}, 100: {:3}, 50: {:2}, miss: {:2}, from: {}, at: {:.0}, pp: {:.2}",
                judgement.hit_result.score_value(),
                self.subsets[cursor].processor.combo(),
                snapshot.score,
                snapshot.accuracy,
                snapshot.count300,
                snapshot.count100,
                snapshot.count50,
                snapshot.count_miss,
                judgement.number,
                judgement.time,
                snapshot.pp.total,
            );
        }
    }

    fn fail_internal(&mut self, cursor: usize) {
        let player = &self.players[cursor];

        if player.cursor.is_replay && self.config.ignore_fails_in_replays {
            return;
        }

        let subset = &mut self.subsets[cursor];

        if !subset.force_fail
            && player
                .diff
                .mods
                .active(Mods::NO_FAIL | Mods::RELAX | Mods::AUTOPILOT)
        {
            return;
        }

        // Easy lives: absorb the fail and refill most of the bar.
        if subset.recoveries > 0 && !subset.sdpf_fail && !subset.force_fail {
            subset.hp.increase_relative(0.8, false);
            subset.recoveries -= 1;
            return;
        }

        if !subset.failed {
            subset.failed = true;
            log::info!("RULESET: Cursor \"{}\" failed", player.cursor.name);
            if let Some(cb) = self.fail_listener.as_mut() {
                cb(cursor);
            }
        }
    }

    /// Playback stopped. Stopping materially before the last object is a
    /// forced fail with a hard health cut.
    pub fn player_stopped(&mut self, cursor: usize, time: f64) {
        // 1ms of slack against slider end rounding.
        if time < self.beatmap.last_end_time() - 1.0 {
            self.subsets[cursor].force_fail = true;
            self.subsets[cursor].hp.increase(-10_000.0, true);
            if self.subsets[cursor].hp.take_fail_signal() {
                self.fail_internal(cursor);
            }
        }
    }

    fn log_ranking(&self) {
        let mut order: Vec<usize> = (0..self.subsets.len()).collect();
        order.sort_by_key(|&i| {
            (
                Reverse(self.subsets[i].score.score),
                Reverse(OrderedFloat(self.subsets[i].score.pp.total)),
            )
        });

        log::info!(
            "RULESET: {:>2} | {:<12} | {:>9} | {:>7} | {:>5} | {:>4} | {:>4} | {:>3} | {:>4} | {:>5} | {:<6} | {:>8}",
            "#", "Player", "Score", "Acc", "Grade", "300", "100", "50", "Miss", "Combo", "Mods", "PP"
        );

        for (rank, &i) in order.iter().enumerate() {
            let score = &self.subsets[i].score;
            log::info!(
                "RULESET: {:>2} | {:<12} | {:>9} | {:>6.2}% | {:>5} | {:>4} | {:>4} | {:>3} | {:>4} | {:>5} | {:<6} | {:>8.2}",
                rank + 1,
                self.players[i].cursor.name,
                score.score,
                score.accuracy,
                score.grade.as_str(),
                score.count300,
                score.count100,
                score.count50,
                score.count_miss,
                score.combo,
                self.players[i].diff.mods.to_string(),
                score.pp.total,
            );
        }
    }

    // --- Listeners ---

    pub fn set_hit_listener(&mut self, listener: HitListener) {
        self.hit_listener = Some(listener);
    }

    pub fn set_end_listener(&mut self, listener: EndListener) {
        self.end_listener = Some(listener);
    }

    pub fn set_fail_listener(&mut self, listener: FailListener) {
        self.fail_listener = Some(listener);
    }

    // --- Queries & cursor feed ---

    pub fn cursor_mut(&mut self, cursor: usize) -> &mut CursorState {
        &mut self.players[cursor].cursor
    }

    pub fn player(&self, cursor: usize) -> &PlayerContext {
        &self.players[cursor]
    }

    pub fn score(&self, cursor: usize) -> Score {
        self.subsets[cursor].score.clone()
    }

    pub fn health(&self, cursor: usize) -> f64 {
        self.subsets[cursor].hp.health()
    }

    pub fn failed(&self, cursor: usize) -> bool {
        self.subsets[cursor].failed
    }

    pub fn recoveries_left(&self, cursor: usize) -> u32 {
        self.subsets[cursor].recoveries
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn beatmap(&self) -> &Beatmap {
        &self.beatmap
    }

    /// Objects currently in the active set, by number.
    pub fn active_objects(&self) -> &[usize] {
        &self.processed
    }

    /// Objects not yet activated, by number.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::beatmap::{
        HitObject, HitObjectData, PathPoint, SliderData, SpinnerData, Vector2,
    };
    use std::cell::Cell;
    use std::rc::Rc;

    const STEP: f64 = 8.0;

    fn circles(count: usize, spacing: f64, group_len: usize) -> Beatmap {
        let objects = (0..count)
            .map(|i| HitObject {
                start_time: 1000.0 + i as f64 * spacing,
                pos: Vector2::new(100.0 + (i % 8) as f32 * 40.0, 200.0),
                stack_index: 0,
                new_combo: i % group_len == 0,
                data: HitObjectData::Circle,
            })
            .collect();
        Beatmap::new(objects, 5.0, 4.0, 7.0, 9.0)
    }

    fn quiet_config() -> GameplayConfig {
        GameplayConfig {
            log_every_hit: false,
            ..GameplayConfig::default()
        }
    }

    fn ruleset_one(map: Beatmap, mods: Mods) -> Ruleset {
        Ruleset::new(
            map,
            quiet_config(),
            vec![CursorState::player("tester")],
            vec![mods],
        )
    }

    fn tick(rs: &mut Ruleset, time: f64) {
        for cursor in 0..1 {
            rs.update_click_for(cursor, time);
            rs.update_normal_for(cursor, time, false);
            rs.update_post_for(cursor, time, false);
        }
        rs.update(time);
    }

    /// A click plan entry: press at `time` with the cursor at `pos`, release
    /// on the following tick.
    struct Click {
        time: f64,
        pos: Vector2,
    }

    fn click_at(map: &Beatmap, number: usize, offset: f64) -> Click {
        Click {
            time: map.objects[number].start_time + offset,
            pos: map.objects[number].pos,
        }
    }

    fn drive(rs: &mut Ruleset, clicks: &[Click], until: f64) {
        let mut ci = 0;
        let mut t = 0.0;

        while t <= until {
            {
                let cursor = rs.cursor_mut(0);
                cursor.left_button = false;
                if ci < clicks.len() && t >= clicks[ci].time {
                    cursor.pos = clicks[ci].pos;
                    cursor.left_button = true;
                    ci += 1;
                }
            }
            tick(rs, t);
            t += STEP;
        }
    }

    fn end_time(map: &Beatmap) -> f64 {
        map.last_end_time() + 1000.0
    }

    #[test]
    fn test_all_perfect_run() {
        let map = circles(10, 500.0, 4);
        let until = end_time(&map);
        let clicks: Vec<Click> = (0..10).map(|i| click_at(&map, i, 0.0)).collect();

        let mut rs = ruleset_one(map, Mods::NONE);
        drive(&mut rs, &clicks, until);

        let score = rs.score(0);
        assert_eq!(score.count300, 10);
        assert_eq!(score.count_miss, 0);
        assert_eq!(score.accuracy, 100.0);
        assert_eq!(score.grade, crate::models::score::Grade::SS);
        assert_eq!(score.combo, 10);
        assert!(score.perfect_combo);
        assert!(score.pp.total > 0.0);
        assert!(rs.is_ended());
        assert!(!rs.failed(0));
    }

    #[test]
    fn test_nine_perfect_one_miss() {
        let map = circles(10, 500.0, 4);
        let until = end_time(&map);
        // Skip object 4 (not at the end); everything else perfect.
        let clicks: Vec<Click> = (0..10)
            .filter(|&i| i != 4)
            .map(|i| click_at(&map, i, 0.0))
            .collect();

        let mut rs = ruleset_one(map, Mods::NONE);
        drive(&mut rs, &clicks, until);

        let score = rs.score(0);
        assert_eq!(score.count300, 9);
        assert_eq!(score.count_miss, 1);
        assert!(score.accuracy < 100.0);
        assert_eq!(score.grade, crate::models::score::Grade::A);
    }

    #[test]
    fn test_late_click_is_a_100() {
        let map = circles(4, 500.0, 4);
        let until = end_time(&map);
        // OD 7: the 300 window is 38ms, the 100 window 84ms.
        let mut clicks: Vec<Click> = (0..3).map(|i| click_at(&map, i, 0.0)).collect();
        clicks.push(click_at(&map, 3, 60.0));

        let mut rs = ruleset_one(map, Mods::NONE);
        drive(&mut rs, &clicks, until);

        let score = rs.score(0);
        assert_eq!(score.count300, 3);
        assert_eq!(score.count100, 1);
        assert!(score.accuracy < 100.0);
    }

    #[test]
    fn test_geki_awarded_per_clean_group() {
        let map = circles(8, 500.0, 4);
        let until = end_time(&map);
        let clicks: Vec<Click> = (0..8).map(|i| click_at(&map, i, 0.0)).collect();

        let mut rs = ruleset_one(map, Mods::NONE);
        drive(&mut rs, &clicks, until);

        // Two groups of four, both perfect.
        let score = rs.score(0);
        assert_eq!(score.count_geki, 2);
        assert_eq!(score.count_katu, 0);
    }

    #[test]
    fn test_katu_on_group_with_a_100() {
        let map = circles(8, 500.0, 4);
        let until = end_time(&map);
        let mut clicks: Vec<Click> = Vec::new();
        for i in 0..8 {
            clicks.push(click_at(&map, i, if i == 1 { 60.0 } else { 0.0 }));
        }

        let mut rs = ruleset_one(map, Mods::NONE);
        drive(&mut rs, &clicks, until);

        let score = rs.score(0);
        assert_eq!(score.count_katu, 1);
        assert_eq!(score.count_geki, 1);
    }

    #[test]
    fn test_positional_miss_touches_nothing() {
        let map = circles(3, 500.0, 4);
        let mut clicks = vec![Click {
            time: 1000.0,
            pos: Vector2::new(400.0, 40.0), // nowhere near object 0
        }];
        clicks.push(click_at(&map, 1, 0.0));
        clicks.push(click_at(&map, 2, 0.0));

        let hits: Rc<Cell<u32>> = Rc::new(Cell::new(0));
        let hits_seen = hits.clone();

        let until = end_time(&map);
        let mut rs = ruleset_one(map, Mods::NONE);
        rs.set_hit_listener(Box::new(move |_, judgement, _| {
            if judgement.hit_result == HitResult::PositionalMiss {
                hits_seen.set(hits_seen.get() + 1);
            }
        }));
        drive(&mut rs, &clicks, until);

        assert!(hits.get() >= 1);
        let score = rs.score(0);
        // The stray click never entered the counts; object 0 timed out.
        assert_eq!(score.count300, 2);
        assert_eq!(score.count_miss, 1);
    }

    #[test]
    fn test_player_stopped_forces_fail_once() {
        let map = circles(10, 500.0, 4);
        let fails: Rc<Cell<u32>> = Rc::new(Cell::new(0));
        let fails_seen = fails.clone();

        let mut rs = ruleset_one(map, Mods::NONE);
        rs.set_fail_listener(Box::new(move |_| {
            fails_seen.set(fails_seen.get() + 1);
        }));

        // Play the first three objects, then stop.
        let map_ref = rs.beatmap().clone();
        let clicks: Vec<Click> = (0..3).map(|i| click_at(&map_ref, i, 0.0)).collect();
        drive(&mut rs, &clicks, 2200.0);

        rs.player_stopped(0, 2200.0);
        rs.player_stopped(0, 2300.0); // repeated stop must not re-fire

        assert!(rs.failed(0));
        assert_eq!(fails.get(), 1);
        assert_eq!(rs.health(0), 0.0);
    }

    #[test]
    fn test_no_fail_swallows_the_fail() {
        // Enough misses to empty the bar several times over.
        let map = circles(100, 300.0, 4);
        let until = end_time(&map);
        let mut rs = ruleset_one(map, Mods::NO_FAIL);
        drive(&mut rs, &[], until);

        let score = rs.score(0);
        assert_eq!(score.count_miss, 100);
        assert!(!rs.failed(0));
    }

    #[test]
    fn test_easy_recoveries_absorb_two_fails() {
        // High drain so misses chew through the bar quickly.
        let map = circles(160, 300.0, 4);
        let until = end_time(&map);

        let fails: Rc<Cell<u32>> = Rc::new(Cell::new(0));
        let fails_seen = fails.clone();

        let mut rs = ruleset_one(map, Mods::EASY);
        rs.set_fail_listener(Box::new(move |_| {
            fails_seen.set(fails_seen.get() + 1);
        }));

        assert_eq!(rs.recoveries_left(0), 2);
        drive(&mut rs, &[], until); // miss everything

        assert_eq!(rs.recoveries_left(0), 0);
        assert!(rs.failed(0));
        assert_eq!(fails.get(), 1);
    }

    #[test]
    fn test_sudden_death_fails_on_first_break() {
        let map = circles(10, 500.0, 4);
        let until = end_time(&map);
        // Hit the first two, miss the third.
        let clicks: Vec<Click> = (0..2).map(|i| click_at(&map, i, 0.0)).collect();

        let fails: Rc<Cell<u32>> = Rc::new(Cell::new(0));
        let fails_seen = fails.clone();

        let mut rs = ruleset_one(map, Mods::SUDDEN_DEATH);
        rs.set_fail_listener(Box::new(move |_| {
            fails_seen.set(fails_seen.get() + 1);
        }));
        drive(&mut rs, &clicks, until);

        assert!(rs.failed(0));
        assert_eq!(fails.get(), 1);
    }

    #[test]
    fn test_perfect_mod_downgrades_a_100_to_miss() {
        let map = circles(4, 500.0, 4);
        let until = end_time(&map);
        let mut clicks: Vec<Click> = (0..3).map(|i| click_at(&map, i, 0.0)).collect();
        clicks.push(click_at(&map, 3, 60.0)); // would be a 100

        let mut rs = ruleset_one(map, Mods::PERFECT);
        drive(&mut rs, &clicks, until);

        let score = rs.score(0);
        assert_eq!(score.count100, 0);
        assert!(score.count_miss >= 1);
        assert!(rs.failed(0));
    }

    #[test]
    fn test_objects_partition_and_end_notifications() {
        let map = circles(10, 500.0, 4);
        let until = end_time(&map);
        let clicks: Vec<Click> = (0..10).map(|i| click_at(&map, i, 0.0)).collect();

        let ends: Rc<Cell<u32>> = Rc::new(Cell::new(0));
        let ends_seen = ends.clone();

        let mut rs = ruleset_one(map, Mods::NONE);
        rs.set_end_listener(Box::new(move |_, _| {
            ends_seen.set(ends_seen.get() + 1);
        }));

        // Mid-run the pending/active sets always cover all unresolved objects.
        assert_eq!(rs.pending_count(), 10);
        drive(&mut rs, &clicks, until);

        assert_eq!(ends.get(), 10);
        assert_eq!(rs.pending_count(), 0);
        assert!(rs.active_objects().is_empty());
    }

    fn slider_map(tick_pos: Vector2, end_pos: Vector2) -> Beatmap {
        let slider = HitObject {
            start_time: 1000.0,
            pos: Vector2::new(100.0, 200.0),
            stack_index: 0,
            new_combo: true,
            data: HitObjectData::Slider(SliderData {
                checkpoints: vec![PathPoint {
                    time: 1300.0,
                    pos: tick_pos,
                    is_repeat: false,
                }],
                end_pos,
                end_time: 1600.0,
            }),
        };
        Beatmap::new(vec![slider], 5.0, 4.0, 7.0, 9.0)
    }

    fn drive_slider(rs: &mut Ruleset, positions: &[(f64, Vector2)], until: f64) {
        let mut t = 0.0;
        while t <= until {
            {
                let cursor = rs.cursor_mut(0);
                cursor.left_button = t >= 1000.0 && t <= 1700.0;
                if let Some(&(_, pos)) = positions.iter().rev().find(|&&(at, _)| t >= at) {
                    cursor.pos = pos;
                }
            }
            tick(rs, t);
            t += STEP;
        }
    }

    #[test]
    fn test_slider_fully_tracked() {
        let tick_pos = Vector2::new(150.0, 200.0);
        let end_pos = Vector2::new(200.0, 200.0);
        let map = slider_map(tick_pos, end_pos);

        let mut rs = ruleset_one(map, Mods::NONE);
        drive_slider(
            &mut rs,
            &[
                (0.0, Vector2::new(100.0, 200.0)),
                (1200.0, tick_pos),
                (1450.0, end_pos),
            ],
            3000.0,
        );

        let score = rs.score(0);
        assert_eq!(score.count300, 1);
        assert_eq!(score.count_slider_breaks, 0);
        assert_eq!(score.combo, 3); // head + tick + end
        assert_eq!(score.accuracy, 100.0);
    }

    #[test]
    fn test_slider_dropped_tick_breaks_combo() {
        // Tick and end far outside the follow radius of a parked cursor.
        let tick_pos = Vector2::new(300.0, 200.0);
        let end_pos = Vector2::new(450.0, 200.0);
        let map = slider_map(tick_pos, end_pos);

        let mut rs = ruleset_one(map, Mods::NONE);
        drive_slider(&mut rs, &[(0.0, Vector2::new(100.0, 200.0))], 3000.0);

        let score = rs.score(0);
        // Head was clicked, everything else dropped: 1 of 3 points.
        assert_eq!(score.count50, 1);
        assert_eq!(score.count_slider_breaks, 1);
        assert_eq!(score.combo, 1);
    }

    #[test]
    fn test_score_v2_reaches_cap_on_perfect_play() {
        let map = circles(10, 500.0, 4);
        let until = end_time(&map);
        let clicks: Vec<Click> = (0..10).map(|i| click_at(&map, i, 0.0)).collect();

        let mut rs = ruleset_one(map, Mods::SCORE_V2);
        drive(&mut rs, &clicks, until);

        assert_eq!(rs.score(0).score, 1_000_000);
    }

    #[test]
    fn test_spinner_autoplay_clears() {
        let spinner = HitObject {
            start_time: 1000.0,
            pos: Vector2::new(256.0, 192.0),
            stack_index: 0,
            new_combo: true,
            data: HitObjectData::Spinner(SpinnerData { end_time: 4000.0 }),
        };
        let map = Beatmap::new(vec![spinner], 5.0, 4.0, 7.0, 9.0);

        let mut rs = Ruleset::new(
            map,
            quiet_config(),
            vec![CursorState::autoplay("auto")],
            vec![Mods::NONE],
        );

        let mut t = 0.0;
        while t <= 5000.0 {
            tick(&mut rs, t);
            t += STEP;
        }

        let score = rs.score(0);
        assert_eq!(score.count300, 1);
        assert!(score.score > 300); // spins and bonus paid out
        assert!(rs.is_ended());
    }
}
