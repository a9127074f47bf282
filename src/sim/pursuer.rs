//! Pursuit controller
//!
//! Per-tick state machine driving one chaser:
//! - `Chasing`: replan on a fixed cadence (or when the path is gone), follow
//!   waypoints, sidestep along one of 8 compass directions when blocked.
//! - `Recovering`: entered after too many near-stationary ticks; wander in a
//!   random direction for a fixed time, then drop the plan and start over.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::World;
use super::planner::RrtStar;
use super::tree::{Path, PlanningTree};
use crate::settings::{PlannerConfig, PursuitConfig};
use crate::{direction_from_angle, step_toward};

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PursuitStatus {
    #[default]
    Chasing,
    Recovering,
}

impl PursuitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PursuitStatus::Chasing => "CHASING",
            PursuitStatus::Recovering => "RECOVERING",
        }
    }
}

/// A chasing agent and everything it owns: planner, path, recovery state, RNG
#[derive(Debug, Clone)]
pub struct PursuitAgent {
    pos: Vec2,
    vel: Vec2,
    world: World,
    planner_config: PlannerConfig,
    config: PursuitConfig,
    planner: RrtStar,
    path: Option<Path>,
    path_index: usize,
    replan_cooldown: u32,
    status: PursuitStatus,
    recovery_timer: u32,
    recovery_dir: Vec2,
    stuck_counter: u32,
    last_pos: Vec2,
    /// Sidestep direction reused until it stops working
    avoidance_dir: Option<Vec2>,
    rng: Pcg32,
}

impl PursuitAgent {
    pub fn new(
        start: Vec2,
        world: World,
        planner_config: PlannerConfig,
        config: PursuitConfig,
        rng: Pcg32,
    ) -> Self {
        let planner = RrtStar::new(start, world.clone(), planner_config);
        Self {
            pos: start,
            vel: Vec2::ZERO,
            world,
            planner_config,
            config,
            planner,
            path: None,
            path_index: 0,
            replan_cooldown: 0,
            status: PursuitStatus::Chasing,
            recovery_timer: 0,
            recovery_dir: Vec2::ZERO,
            stuck_counter: 0,
            last_pos: start,
            avoidance_dir: None,
            rng,
        }
    }

    /// Agent with default tuning and a seeded RNG
    pub fn with_seed(start: Vec2, world: World, seed: u64) -> Self {
        Self::new(
            start,
            world,
            PlannerConfig::default(),
            PursuitConfig::default(),
            Pcg32::seed_from_u64(seed),
        )
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Displacement over the last tick
    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn status(&self) -> PursuitStatus {
        self.status
    }

    pub fn is_recovering(&self) -> bool {
        self.status == PursuitStatus::Recovering
    }

    pub fn tree(&self) -> &PlanningTree {
        self.planner.tree()
    }

    /// `(parent, child)` segments of the current tree
    pub fn tree_edges(&self) -> Vec<(Vec2, Vec2)> {
        self.planner.tree().edges().collect()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Current path as points (empty when there is none)
    pub fn path_points(&self) -> &[Vec2] {
        self.path.as_ref().map(Path::points).unwrap_or(&[])
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Advance one tick toward `pursued` moving at up to `speed` units
    pub fn tick(&mut self, pursued: Vec2, speed: f32) {
        let start = self.pos;
        self.detect_stuck();

        match self.status {
            PursuitStatus::Recovering => self.tick_recovering(speed),
            PursuitStatus::Chasing => self.tick_chasing(pursued, speed),
        }

        self.vel = self.pos - start;
    }

    fn detect_stuck(&mut self) {
        if self.status == PursuitStatus::Chasing && self.pos.distance(self.last_pos) < self.config.stuck_threshold {
            self.stuck_counter += 1;
        } else {
            self.stuck_counter = 0;
        }
        self.last_pos = self.pos;

        if self.stuck_counter > self.config.stuck_ticks {
            self.status = PursuitStatus::Recovering;
            self.recovery_timer = self.config.recovery_ticks;
            self.recovery_dir = self.random_direction();
            self.stuck_counter = 0;
            log::debug!("pursuer stuck at {}, recovering toward {}", self.pos, self.recovery_dir);
        }
    }

    fn tick_recovering(&mut self, speed: f32) {
        self.recovery_timer = self.recovery_timer.saturating_sub(1);
        if self.recovery_timer == 0 {
            self.status = PursuitStatus::Chasing;
            self.planner = RrtStar::new(self.pos, self.world.clone(), self.planner_config);
            self.path = None;
            self.avoidance_dir = None;
            log::debug!("pursuer recovered at {}", self.pos);
            return;
        }

        let next = self.pos + self.recovery_dir * (speed * self.config.recovery_speed_factor);
        if self.world.is_point_valid(next) {
            self.pos = next;
        } else {
            self.recovery_dir = self.random_direction();
        }
    }

    fn tick_chasing(&mut self, pursued: Vec2, speed: f32) {
        self.replan_cooldown = self.replan_cooldown.saturating_sub(1);
        if self.replan_cooldown == 0 || self.path.as_ref().is_none_or(Path::is_empty) {
            self.replan(pursued);
        }

        let Some(waypoint) = self.path.as_ref().and_then(|p| p.get(self.path_index)) else {
            return;
        };

        let (next, reached) = step_toward(self.pos, waypoint, speed);
        if reached {
            self.pos = waypoint;
            self.path_index += 1;
        } else if self.world.is_point_valid(next) {
            self.pos = next;
            self.avoidance_dir = None;
        } else {
            self.sidestep(speed);
        }
    }

    /// Drop the current tree and plan from scratch toward `target`
    ///
    /// A failed episode keeps the previous path, if any.
    fn replan(&mut self, target: Vec2) {
        self.planner = RrtStar::new(self.pos, self.world.clone(), self.planner_config);
        let outcome = self
            .planner
            .plan(target, self.planner_config.iteration_budget, &mut self.rng);

        match outcome.path {
            Some(path) => {
                log::debug!(
                    "replanned in {} iterations: {} waypoints, length {:.1}, {} nodes",
                    outcome.iterations,
                    path.len(),
                    path.length(),
                    self.planner.tree().len()
                );
                self.path = Some(path);
                self.path_index = 0;
                self.avoidance_dir = None;
            }
            None => {
                log::debug!(
                    "no path to {} after {} iterations ({} nodes)",
                    target,
                    outcome.iterations,
                    self.planner.tree().len()
                );
            }
        }
        self.replan_cooldown = self.config.replan_interval;
    }

    /// Step along the cached or a fresh avoidance direction; force a replan if none works
    fn sidestep(&mut self, speed: f32) {
        if self.avoidance_dir.is_none() {
            self.avoidance_dir = self.find_avoidance_direction();
        }

        match self.avoidance_dir {
            Some(dir) => {
                let next = self.pos + dir * speed;
                if self.world.is_point_valid(next) {
                    self.pos = next;
                } else {
                    self.avoidance_dir = None;
                }
            }
            None => self.replan_cooldown = 0,
        }
    }

    /// First of the 8 compass directions (0°, 45°, ... 315°) whose probe point is valid
    fn find_avoidance_direction(&self) -> Option<Vec2> {
        (0..8)
            .map(|i| direction_from_angle(i as f32 * FRAC_PI_4))
            .find(|dir| {
                self.world
                    .is_point_valid(self.pos + *dir * self.config.avoidance_probe_distance)
            })
    }

    fn random_direction(&mut self) -> Vec2 {
        let theta = self.rng.random_range(0.0..std::f32::consts::TAU);
        direction_from_angle(theta)
    }
}
