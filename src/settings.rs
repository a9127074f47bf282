//! Game settings and tuning
//!
//! Every constant the planner, controller and host loop consume can be
//! overridden from a JSON file. Missing fields fall back to the defaults in
//! [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read or written
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON for [`Settings`]
    #[error("settings parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values are internally inconsistent
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// World extents and agent footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Side of the square agent footprint
    pub agent_size: f32,
    /// Agents must keep their center at least this far from each edge
    pub margin: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            agent_size: AGENT_SIZE,
            margin: WORLD_MARGIN,
        }
    }
}

/// RRT* tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Longest edge a single growth step may add
    pub max_step_distance: f32,
    /// Probability of sampling the target instead of a random point
    pub goal_bias: f32,
    /// Rewiring neighborhood radius
    pub neighbor_radius: f32,
    /// Samples per segment clearance check
    pub segment_steps: u32,
    /// Growth attempts per replanning episode
    pub iteration_budget: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_step_distance: MAX_STEP_DISTANCE,
            goal_bias: GOAL_BIAS,
            neighbor_radius: NEIGHBOR_RADIUS,
            segment_steps: SEGMENT_STEPS,
            iteration_budget: ITERATION_BUDGET,
        }
    }
}

/// Pursuit controller tuning (all durations in ticks)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Per-tick displacement below which the agent counts as stationary
    pub stuck_threshold: f32,
    /// Stationary ticks tolerated before recovery kicks in
    pub stuck_ticks: u32,
    pub recovery_ticks: u32,
    /// Recovery moves at this fraction of normal speed
    pub recovery_speed_factor: f32,
    pub replan_interval: u32,
    pub avoidance_probe_distance: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            stuck_threshold: STUCK_THRESHOLD,
            stuck_ticks: STUCK_TICKS,
            recovery_ticks: RECOVERY_TICKS,
            recovery_speed_factor: RECOVERY_SPEED_FACTOR,
            replan_interval: REPLAN_INTERVAL,
            avoidance_probe_distance: AVOIDANCE_PROBE_DISTANCE,
        }
    }
}

/// Host loop tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_speed: f32,
    pub pursuer_speed: f32,
    /// Added to player speed every `SCORE_STEP` points
    pub player_speedup: f32,
    /// Added to pursuer speed every `SCORE_STEP` points
    pub pursuer_speedup: f32,
    pub obstacle_count: usize,
    pub collectible_count: usize,
    /// Run seed for reproducibility
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            pursuer_speed: PURSUER_SPEED,
            player_speedup: PLAYER_SPEEDUP,
            pursuer_speedup: PURSUER_SPEEDUP,
            obstacle_count: OBSTACLE_COUNT,
            collectible_count: COLLECTIBLE_COUNT,
            seed: 0,
        }
    }
}

/// All tunables
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldConfig,
    pub planner: PlannerConfig,
    pub pursuit: PursuitConfig,
    pub game: GameConfig,
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject settings under which no agent position can be valid
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if w.agent_size <= 0.0 || w.margin < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "agent size {} / margin {} must be positive",
                w.agent_size, w.margin
            )));
        }
        if w.width < 2.0 * w.margin || w.height < 2.0 * w.margin || w.width < w.agent_size || w.height < w.agent_size
        {
            return Err(SettingsError::Invalid(format!(
                "world {}x{} too small for footprint {} with margin {}",
                w.width, w.height, w.agent_size, w.margin
            )));
        }
        if !(0.0..=1.0).contains(&self.planner.goal_bias) {
            return Err(SettingsError::Invalid(format!(
                "goal bias {} outside [0, 1]",
                self.planner.goal_bias
            )));
        }
        if self.planner.max_step_distance <= 0.0 || self.planner.segment_steps == 0 {
            return Err(SettingsError::Invalid(
                "planner step distance and segment steps must be positive".into(),
            ));
        }
        if self.game.player_speed <= 0.0 || self.game.pursuer_speed <= 0.0 {
            return Err(SettingsError::Invalid("speeds must be positive".into()));
        }
        Ok(())
    }
}
