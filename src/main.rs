//! RRT* Chase headless runner
//!
//! Plays one run with a scripted player against the planner-driven chaser and
//! reports how long the player survived.
//!
//! Usage: `rrt-chase [settings.json] [max_ticks]`

use glam::Vec2;

use rrt_chase::Settings;
use rrt_chase::sim::{GamePhase, GameState, TickInput, tick};

/// One simulated minute at 60 ticks per second
const DEFAULT_MAX_TICKS: u64 = 60 * 60;
/// Player flees once the chaser is closer than this
const PANIC_DISTANCE: f32 = 150.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path).unwrap_or_else(|e| {
            log::warn!("Falling back to default settings: {}", e);
            Settings::default()
        }),
        None => Settings::default(),
    };
    let max_ticks = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_TICKS);

    log::info!("RRT* Chase (headless) starting, seed {}", settings.game.seed);

    let mut state = GameState::new(settings);
    let mut last_status = state.pursuer.status();

    while state.time_ticks < max_ticks && state.phase == GamePhase::Playing {
        let input = TickInput {
            move_dir: scripted_input(&state),
            restart: false,
        };
        tick(&mut state, &input);

        let status = state.pursuer.status();
        if status != last_status {
            log::info!("tick {}: chaser {}", state.time_ticks, status.as_str());
            last_status = status;
        }
        if state.time_ticks % 60 == 0 {
            log::debug!(
                "tick {}: {} | tree {} nodes | path {} points",
                state.time_ticks,
                state.status_line(),
                state.pursuer.tree().len(),
                state.pursuer.path_points().len()
            );
        }
    }

    let outcome = match state.phase {
        GamePhase::Caught => "caught",
        GamePhase::Playing => "survived",
    };
    println!(
        "{} after {} ticks with score {}",
        outcome, state.time_ticks, state.score
    );
}

/// Run from the chaser when it is close, otherwise head for the nearest collectible
fn scripted_input(state: &GameState) -> Vec2 {
    let player = state.player.pos;
    let chaser = state.pursuer.pos();
    if player.distance(chaser) < PANIC_DISTANCE {
        return player - chaser;
    }
    state
        .collectibles
        .iter()
        .map(|c| c.pos)
        .min_by(|a, b| {
            a.distance(player)
                .partial_cmp(&b.distance(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|target| target - player)
        .unwrap_or(Vec2::ZERO)
}
