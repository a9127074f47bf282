//! Fixed-step game tick
//!
//! One call advances the whole game by one frame: player input, chaser
//! planning and movement, pickups, and the catch check. Nothing here sleeps or
//! paces frames; the host decides how often to call [`tick`].

use glam::Vec2;

use super::geometry::{footprint, rects_overlap};
use super::state::{GamePhase, GameState};
use crate::consts::SCORE_STEP;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Desired movement direction (any length, zero for idle)
    pub move_dir: Vec2,
    /// Start a new run after being caught
    pub restart: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase == GamePhase::Caught {
        if input.restart {
            log::info!("Restarting after final score {}", state.score);
            state.restart();
        }
        return;
    }

    state.time_ticks += 1;

    let player_speed = state.player_speed();
    let pursuer_speed = state.pursuer_speed();

    state.player.update(input.move_dir, player_speed, &state.world);
    state.pursuer.tick(state.player.pos, pursuer_speed);

    collect_pickups(state);

    if state.score >= state.last_spawn_score + SCORE_STEP {
        state.spawn_batch();
        state.last_spawn_score = state.score;
        log::info!("Score {}: spawned new collectibles ({} active)", state.score, state.collectibles.len());
    }

    let size = state.world.bounds.agent_size;
    let (p_min, p_max) = footprint(state.player.pos, size);
    let (e_min, e_max) = footprint(state.pursuer.pos(), size);
    if rects_overlap(p_min, p_max, e_min, e_max) {
        state.phase = GamePhase::Caught;
        log::info!("Caught at tick {} with score {}", state.time_ticks, state.score);
    }
}

/// Remove every collectible the player overlaps and score it
fn collect_pickups(state: &mut GameState) {
    let (p_min, p_max) = footprint(state.player.pos, state.world.bounds.agent_size);
    let before = state.collectibles.len();
    state.collectibles.retain(|c| {
        let (c_min, c_max) = c.bounds();
        !rects_overlap(p_min, p_max, c_min, c_max)
    });
    let picked = (before - state.collectibles.len()) as u64;
    if picked > 0 {
        state.score += picked;
        log::debug!("Picked {} collectible(s), score {}", picked, state.score);
    }
}
