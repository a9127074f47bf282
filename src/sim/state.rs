//! Game state and host-side entities
//!
//! Owns the static world, the controllable player, the chaser and the
//! collectibles. The chaser only ever sees the world through its own
//! read-only [`World`] handle.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::{Obstacle, World, WorldBounds, footprint};
use super::level::{Collectible, generate_obstacles, spawn_collectibles};
use super::pursuer::PursuitAgent;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// The chaser reached the player
    Caught,
}

/// The controllable agent
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self { pos }
    }

    /// Move along `dir` (normalized here) at `speed`; blocked moves are dropped
    pub fn update(&mut self, dir: Vec2, speed: f32, world: &World) {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let next = world.bounds.clamp(self.pos + dir * speed);
        let (min, max) = footprint(next, world.bounds.agent_size);
        if !world.box_hits_obstacle(min, max) {
            self.pos = next;
        }
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Host RNG: level layout, collectibles, chaser seeds
    rng: Pcg32,
    pub world: World,
    pub player: Player,
    pub pursuer: PursuitAgent,
    pub collectibles: Vec<Collectible>,
    pub score: u64,
    /// Score at which the last collectible batch spawned
    pub last_spawn_score: u64,
    pub time_ticks: u64,
    pub phase: GamePhase,
}

impl GameState {
    /// New run with a random layout drawn from `settings.game.seed`
    pub fn new(settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.game.seed);
        let (player_spawn, pursuer_spawn) = Self::spawn_points(&settings);
        let obstacles = generate_obstacles(
            &mut rng,
            &settings.world,
            settings.game.obstacle_count,
            &[player_spawn, pursuer_spawn],
        );
        let mut state = Self::build(settings, rng, obstacles, Vec::new());
        let count = state.settings.game.collectible_count;
        spawn_collectibles(&mut state.rng, &state.world, &mut state.collectibles, count);
        log::info!(
            "New run (seed {}): {} obstacles, {} collectibles",
            state.settings.game.seed,
            state.world.obstacles().len(),
            state.collectibles.len()
        );
        state
    }

    /// New run with a fixed layout
    pub fn with_layout(settings: Settings, obstacles: Vec<Obstacle>, collectibles: Vec<Collectible>) -> Self {
        let rng = Pcg32::seed_from_u64(settings.game.seed);
        Self::build(settings, rng, obstacles, collectibles)
    }

    fn build(settings: Settings, mut rng: Pcg32, obstacles: Vec<Obstacle>, collectibles: Vec<Collectible>) -> Self {
        let (player_spawn, pursuer_spawn) = Self::spawn_points(&settings);
        let world = World::new(WorldBounds::from(settings.world), obstacles);
        let pursuer = PursuitAgent::new(
            pursuer_spawn,
            world.clone(),
            settings.planner,
            settings.pursuit,
            Pcg32::seed_from_u64(rng.random()),
        );
        Self {
            settings,
            rng,
            world,
            player: Player::new(player_spawn),
            pursuer,
            collectibles,
            score: 0,
            last_spawn_score: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
        }
    }

    /// Player starts in the middle, the chaser near the top-left corner
    fn spawn_points(settings: &Settings) -> (Vec2, Vec2) {
        let w = &settings.world;
        let player = Vec2::new((w.width / 2.0).floor(), (w.height / 2.0).floor());
        let pursuer = Vec2::new(50.0, 50.0);
        (player, pursuer)
    }

    /// Start over with a fresh layout drawn from the running RNG
    pub fn restart(&mut self) {
        let mut settings = self.settings;
        settings.game.seed = self.rng.random();
        *self = Self::new(settings);
    }

    /// Speed-up tier reached by the current score
    pub fn level(&self) -> u64 {
        self.score / crate::consts::SCORE_STEP
    }

    pub fn player_speed(&self) -> f32 {
        let g = &self.settings.game;
        g.player_speed + self.level() as f32 * g.player_speedup
    }

    pub fn pursuer_speed(&self) -> f32 {
        let g = &self.settings.game;
        g.pursuer_speed + self.level() as f32 * g.pursuer_speedup
    }

    /// Top up collectibles with a fresh batch
    pub fn spawn_batch(&mut self) {
        let count = self.settings.game.collectible_count;
        spawn_collectibles(&mut self.rng, &self.world, &mut self.collectibles, count);
    }

    /// HUD line: score and chaser status
    pub fn status_line(&self) -> String {
        format!(
            "Score: {} | Status: {}",
            self.score,
            self.pursuer.status().as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(Settings::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos, Vec2::new(500.0, 300.0));
        assert_eq!(state.pursuer.pos(), Vec2::new(50.0, 50.0));
        assert!(state.world.is_point_valid(state.player.pos));
        assert!(state.world.is_point_valid(state.pursuer.pos()));
        assert!(!state.collectibles.is_empty());
    }

    #[test]
    fn test_seeded_layout() {
        let mut settings = Settings::default();
        settings.game.seed = 77;
        let a = GameState::new(settings);
        let b = GameState::new(settings);
        assert_eq!(a.world.obstacles(), b.world.obstacles());
        assert_eq!(a.collectibles, b.collectibles);
    }

    #[test]
    fn test_player_blocked_by_obstacle() {
        let world = World::new(
            WorldBounds::default(),
            vec![Obstacle::new(517.0, 200.0, 50.0, 200.0)],
        );
        let mut player = Player::new(Vec2::new(500.0, 300.0));
        player.update(Vec2::new(1.0, 0.0), 5.0, &world);
        assert_eq!(player.pos, Vec2::new(500.0, 300.0));

        player.update(Vec2::new(-1.0, 0.0), 5.0, &world);
        assert_eq!(player.pos, Vec2::new(495.0, 300.0));
    }

    #[test]
    fn test_player_diagonal_is_normalized_and_clamped() {
        let world = World::empty(WorldBounds::default());
        let mut player = Player::new(Vec2::new(500.0, 300.0));
        player.update(Vec2::new(1.0, 1.0), 5.0, &world);
        assert!((player.pos.distance(Vec2::new(500.0, 300.0)) - 5.0).abs() < 1e-4);

        let mut player = Player::new(Vec2::new(17.0, 300.0));
        player.update(Vec2::new(-1.0, 0.0), 5.0, &world);
        assert_eq!(player.pos, Vec2::new(15.0, 300.0));
    }

    #[test]
    fn test_speeds_scale_with_score() {
        let mut state = GameState::with_layout(Settings::default(), Vec::new(), Vec::new());
        assert_eq!(state.player_speed(), 5.0);
        assert_eq!(state.pursuer_speed(), 3.0);
        state.score = 4;
        assert_eq!(state.pursuer_speed(), 3.0);
        state.score = 12;
        assert_eq!(state.player_speed(), 5.5);
        assert_eq!(state.pursuer_speed(), 4.0);
    }

    #[test]
    fn test_status_line() {
        let state = GameState::with_layout(Settings::default(), Vec::new(), Vec::new());
        assert_eq!(state.status_line(), "Score: 0 | Status: CHASING");
    }
}
