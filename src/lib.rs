//! RRT* Chase - a pursuit game with a replanning chaser
//!
//! Core modules:
//! - `sim`: Deterministic simulation (validity oracle, RRT* planner, pursuit controller, game loop)
//! - `settings`: Data-driven tuning loaded from JSON

pub mod settings;
pub mod sim;

pub use settings::{GameConfig, PlannerConfig, PursuitConfig, Settings, SettingsError, WorldConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// World dimensions
    pub const WORLD_WIDTH: f32 = 1000.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Side of the square footprint shared by player and pursuer
    pub const AGENT_SIZE: f32 = 30.0;
    /// Keep-out band along the world edges (half the footprint)
    pub const WORLD_MARGIN: f32 = 15.0;

    /// RRT* defaults
    pub const MAX_STEP_DISTANCE: f32 = 80.0;
    pub const GOAL_BIAS: f32 = 0.35;
    pub const NEIGHBOR_RADIUS: f32 = 150.0;
    pub const SEGMENT_STEPS: u32 = 10;
    pub const ITERATION_BUDGET: u32 = 500;

    /// Pursuit controller defaults
    pub const STUCK_THRESHOLD: f32 = 1.0;
    pub const STUCK_TICKS: u32 = 18;
    pub const RECOVERY_TICKS: u32 = 25;
    pub const RECOVERY_SPEED_FACTOR: f32 = 0.8;
    pub const REPLAN_INTERVAL: u32 = 15;
    pub const AVOIDANCE_PROBE_DISTANCE: f32 = 40.0;

    /// Gameplay defaults
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PURSUER_SPEED: f32 = 3.0;
    pub const PLAYER_SPEEDUP: f32 = 0.25;
    pub const PURSUER_SPEEDUP: f32 = 0.5;
    /// Score interval between speed-ups and collectible respawns
    pub const SCORE_STEP: u64 = 5;
    pub const OBSTACLE_COUNT: usize = 8;
    pub const COLLECTIBLE_COUNT: usize = 5;
    pub const COLLECTIBLE_SIZE: f32 = 15.0;
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Move `pos` toward `target` by at most `max_step`, returning the new position
/// and whether the target was reached
#[inline]
pub fn step_toward(pos: Vec2, target: Vec2, max_step: f32) -> (Vec2, bool) {
    let delta = target - pos;
    let dist = delta.length();
    if dist <= max_step {
        (target, true)
    } else {
        (pos + delta / dist * max_step, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_angle() {
        let d = direction_from_angle(std::f32::consts::FRAC_PI_2);
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward() {
        let (p, reached) = step_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 3.0);
        assert!(!reached);
        assert!((p.x - 3.0).abs() < 1e-6);

        let (p, reached) = step_toward(Vec2::ZERO, Vec2::new(2.0, 0.0), 3.0);
        assert!(reached);
        assert_eq!(p, Vec2::new(2.0, 0.0));
    }
}
