//! Demo entry point: generates a random map, plays it back with an autoplay
//! cursor and logs the final ranking table.

use rand::Rng;
use rjudge::models::beatmap::{Beatmap, HitObject, HitObjectData, PathPoint, SliderData, SpinnerData, Vector2};
use rjudge::models::cursor::CursorState;
use rjudge::models::mods::Mods;
use rjudge::models::settings::GameplayConfig;
use rjudge::Ruleset;

/// Génère une map aléatoire : cercles, quelques sliders, un spinner.
fn generate_map() -> Beatmap {
    let mut rng = rand::rng();
    let mut objects = Vec::new();
    let mut current_time = 1500.0;

    for i in 0..150 {
        let pos = Vector2::new(
            rng.random_range(60.0..450.0),
            rng.random_range(60.0..320.0),
        );
        let new_combo = i == 0 || rng.random_range(0..5) == 0;

        let roll = rng.random_range(0..100);
        let data = if roll < 85 {
            HitObjectData::Circle
        } else if roll < 97 {
            let duration = rng.random_range(300.0..500.0);
            let end_pos = Vector2::new(
                (pos.x + rng.random_range(-80.0..80.0)).clamp(20.0, 490.0),
                (pos.y + rng.random_range(-80.0..80.0)).clamp(20.0, 370.0),
            );
            let mid = Vector2::new((pos.x + end_pos.x) / 2.0, (pos.y + end_pos.y) / 2.0);
            HitObjectData::Slider(SliderData {
                checkpoints: vec![PathPoint {
                    time: current_time + duration / 2.0,
                    pos: mid,
                    is_repeat: false,
                }],
                end_pos,
                end_time: current_time + duration,
            })
        } else {
            HitObjectData::Spinner(SpinnerData {
                end_time: current_time + 2000.0,
            })
        };

        let obj = HitObject {
            start_time: current_time,
            pos,
            stack_index: 0,
            new_combo,
            data,
        };
        current_time = obj.end_time() + rng.random_range(250.0..600.0);
        objects.push(obj);
    }

    Beatmap::new(objects, 5.0, 4.0, 7.0, 9.0)
}

/// Minimal autoplay feeder: snaps the cursor to the due object and presses
/// at object times. Just a demo driver; real cursor synthesis lives outside
/// the engine.
struct AutoFeeder {
    index: usize,
    release_at: f64,
}

impl AutoFeeder {
    fn new() -> Self {
        Self {
            index: 0,
            release_at: 0.0,
        }
    }

    fn feed(&mut self, ruleset: &mut Ruleset, map: &Beatmap, time: f64) {
        while self.index < map.objects.len() && time > map.objects[self.index].end_time() + 50.0 {
            self.index += 1;
        }

        let cursor = ruleset.cursor_mut(0);
        cursor.left_button = false;

        let Some(obj) = map.objects.get(self.index) else {
            return;
        };

        match &obj.data {
            HitObjectData::Circle => {
                cursor.pos = obj.pos;
                if time >= obj.start_time && self.release_at < obj.start_time {
                    cursor.left_button = true;
                    self.release_at = obj.start_time + 30.0;
                } else if time < self.release_at {
                    cursor.left_button = true;
                }
            }
            HitObjectData::Slider(data) => {
                // Sit on the next checkpoint so tracking always lands.
                cursor.pos = data
                    .checkpoints
                    .iter()
                    .find(|cp| cp.time >= time)
                    .map(|cp| cp.pos)
                    .unwrap_or(data.end_pos);
                if time < obj.start_time {
                    cursor.pos = obj.pos;
                }
                cursor.left_button = time >= obj.start_time;
            }
            HitObjectData::Spinner(_) => {
                // Autoplay cursors spin on their own.
                cursor.pos = obj.pos;
            }
        }
    }
}

fn main() {
    unsafe {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    log::info!("MAIN: Booting rjudge demo...");

    let map = generate_map();
    let feeder_map = map.clone();
    let end = map.last_end_time() + 1000.0;
    log::info!(
        "MAIN: Generated map: {} objects, max combo {}",
        map.objects.len(),
        map.max_combo()
    );

    let config = GameplayConfig {
        log_every_hit: false,
        ..GameplayConfig::default()
    };

    let mut ruleset = Ruleset::new(
        map,
        config,
        vec![CursorState::autoplay("rjudge")],
        vec![Mods::NONE],
    );

    let mut feeder = AutoFeeder::new();
    let mut time = 0.0;

    while !ruleset.is_ended() && time <= end {
        feeder.feed(&mut ruleset, &feeder_map, time);

        ruleset.update_click_for(0, time);
        ruleset.update_normal_for(0, time, false);
        ruleset.update_post_for(0, time, false);
        ruleset.update(time);

        time += 4.0;
    }

    let score = ruleset.score(0);
    log::info!(
        "MAIN: Finished: score {}, combo {}x, acc {:.2}%, grade {}, {:.2}pp",
        score.score,
        score.combo,
        score.accuracy,
        score.grade.as_str(),
        score.pp.total
    );
}
