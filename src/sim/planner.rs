//! Incremental RRT* planner
//!
//! Each call to [`RrtStar::grow_once`] attempts a single tree extension:
//! sample (goal-biased), find the nearest node, steer at most
//! `max_step_distance`, admit the candidate if the connecting segment is clear,
//! rewire neighbors through the new node, then try to connect to the target.
//!
//! Rewiring only ever routes existing neighbors *through* the newest node. The
//! new node keeps the parent it was steered from, even if a cheaper neighbor
//! exists.

use glam::Vec2;
use rand::Rng;

use super::geometry::World;
use super::tree::{NodeId, Path, PlanningTree};
use crate::settings::PlannerConfig;

/// Result of a bounded planning episode
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Path to the target, if one was found within the budget
    pub path: Option<Path>,
    /// Growth attempts consumed
    pub iterations: u32,
}

/// RRT* state for one planning episode
#[derive(Debug, Clone)]
pub struct RrtStar {
    tree: PlanningTree,
    world: World,
    config: PlannerConfig,
}

impl RrtStar {
    /// Fresh tree rooted at `start`
    pub fn new(start: Vec2, world: World, config: PlannerConfig) -> Self {
        Self {
            tree: PlanningTree::new(start),
            world,
            config,
        }
    }

    pub fn tree(&self) -> &PlanningTree {
        &self.tree
    }

    pub fn root_pos(&self) -> Vec2 {
        self.tree.pos(self.tree.root())
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// One growth attempt toward `target`
    ///
    /// Returns the root -> target path when this attempt connects to the target.
    pub fn grow_once<R: Rng + ?Sized>(&mut self, target: Vec2, rng: &mut R) -> Option<Path> {
        let sample = if rng.random::<f32>() < self.config.goal_bias {
            target
        } else {
            self.world.sample_point(rng)
        };

        let nearest = self.tree.nearest(sample);
        let nearest_pos = self.tree.pos(nearest);
        let candidate = self.steer(nearest_pos, sample)?;

        let steps = self.config.segment_steps;
        if !self.world.is_segment_clear(nearest_pos, candidate, steps) || !self.world.is_point_valid(candidate) {
            return None;
        }

        let new_node = self
            .tree
            .insert(nearest, candidate, nearest_pos.distance(candidate));
        let rewired = self.rewire(new_node);
        if rewired > 0 {
            log::trace!("rewired {} nodes through {:?}", rewired, new_node);
        }

        if candidate.distance(target) < self.config.max_step_distance
            && self.world.is_segment_clear(candidate, target, steps)
            && self.world.is_point_valid(target)
        {
            let goal = self
                .tree
                .insert(new_node, target, candidate.distance(target));
            return Some(self.tree.path_to(goal));
        }

        None
    }

    /// Run up to `budget` growth attempts, stopping at the first path
    pub fn plan<R: Rng + ?Sized>(&mut self, target: Vec2, budget: u32, rng: &mut R) -> PlanOutcome {
        for i in 0..budget {
            if let Some(path) = self.grow_once(target, rng) {
                return PlanOutcome {
                    path: Some(path),
                    iterations: i + 1,
                };
            }
        }
        PlanOutcome {
            path: None,
            iterations: budget,
        }
    }

    /// Candidate position at most `max_step_distance` from `from` toward `sample`,
    /// clamped into the world margin. None when `sample` coincides with `from`.
    fn steer(&self, from: Vec2, sample: Vec2) -> Option<Vec2> {
        let delta = sample - from;
        let dist = delta.length();
        if dist <= 0.0 {
            return None;
        }
        let step = dist.min(self.config.max_step_distance);
        let candidate = from + delta / dist * step;
        Some(self.world.bounds.clamp(candidate))
    }

    /// Route neighbors of `new_node` through it when strictly cheaper and clear
    fn rewire(&mut self, new_node: NodeId) -> usize {
        let new_pos = self.tree.pos(new_node);
        let new_cost = self.tree.cost(new_node);
        let mut rewired = 0;

        for neighbor in self.tree.nodes_within_radius(new_pos, self.config.neighbor_radius) {
            let neighbor_pos = self.tree.pos(neighbor);
            let cost = new_cost + new_pos.distance(neighbor_pos);
            if cost < self.tree.cost(neighbor)
                && self
                    .world
                    .is_segment_clear(new_pos, neighbor_pos, self.config.segment_steps)
                && self.tree.rewire_parent(neighbor, new_node, cost)
            {
                rewired += 1;
            }
        }
        rewired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{Obstacle, WorldBounds};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn open_world() -> World {
        World::empty(WorldBounds::default())
    }

    fn assert_tree_consistent(tree: &PlanningTree) {
        assert_eq!(tree.cost(tree.root()), 0.0);
        assert!(tree.node(tree.root()).parent.is_none());
        for id in tree.ids().skip(1) {
            let node = tree.node(id);
            let parent = node.parent.expect("orphan node");
            let expected = tree.cost(parent) + tree.pos(parent).distance(node.pos);
            assert!((node.cost - expected).abs() < 1e-2);
        }
    }

    #[test]
    fn test_open_world_finds_path() {
        let start = Vec2::new(50.0, 50.0);
        let target = Vec2::new(500.0, 300.0);
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut planner = RrtStar::new(start, open_world(), PlannerConfig::default());
            let outcome = planner.plan(target, 500, &mut rng);
            let path = outcome.path.expect("no path in open world");
            assert!(path.len() >= 2);
            assert!(path.first().unwrap().distance(start) < 1e-4);
            assert!(path.last().unwrap().distance(target) < 1e-4);
            assert!(outcome.iterations <= 500);
            assert_tree_consistent(planner.tree());
        }
    }

    #[test]
    fn test_path_edges_respect_step_limit() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut planner = RrtStar::new(Vec2::new(50.0, 50.0), open_world(), PlannerConfig::default());
        let path = planner
            .plan(Vec2::new(900.0, 500.0), 500, &mut rng)
            .path
            .unwrap();
        // Rewiring may connect nodes up to the neighbor radius apart
        for w in path.points().windows(2) {
            assert!(w[0].distance(w[1]) <= 150.0 + 1e-3);
        }
    }

    #[test]
    fn test_path_routes_around_wall() {
        // Wall across the middle with a gap at the bottom
        let obstacles = vec![Obstacle::new(480.0, 0.0, 40.0, 480.0)];
        let world = World::new(WorldBounds::default(), obstacles);
        let start = Vec2::new(100.0, 100.0);
        let target = Vec2::new(900.0, 100.0);

        let mut rng = Pcg32::seed_from_u64(3);
        // A couple of episodes can be needed to find the gap
        let (planner, path) = (0..10)
            .find_map(|_| {
                let mut planner = RrtStar::new(start, world.clone(), PlannerConfig::default());
                let path = planner.plan(target, 2000, &mut rng).path?;
                Some((planner, path))
            })
            .expect("no path around wall");
        for p in path.points() {
            assert!(world.is_point_valid(*p));
        }
        // Some waypoint must dip below the wall
        assert!(path.points().iter().any(|p| p.y > 480.0));
        assert_tree_consistent(planner.tree());
    }

    #[test]
    fn test_unreachable_target_exhausts_budget() {
        // Target sits inside an obstacle
        let obstacles = vec![Obstacle::new(400.0, 250.0, 100.0, 100.0)];
        let world = World::new(WorldBounds::default(), obstacles);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut planner = RrtStar::new(Vec2::new(50.0, 50.0), world, PlannerConfig::default());
        let outcome = planner.plan(Vec2::new(450.0, 300.0), 300, &mut rng);
        assert!(outcome.path.is_none());
        assert_eq!(outcome.iterations, 300);
        assert!(planner.tree().len() > 1);
        assert_tree_consistent(planner.tree());
    }

    #[test]
    fn test_sample_on_node_adds_nothing() {
        // Goal bias 1 and target == root: every sample coincides with the root
        let config = PlannerConfig {
            goal_bias: 1.0,
            ..PlannerConfig::default()
        };
        let start = Vec2::new(300.0, 300.0);
        let mut planner = RrtStar::new(start, open_world(), config);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..10 {
            assert!(planner.grow_once(start, &mut rng).is_none());
        }
        assert_eq!(planner.tree().len(), 1);
    }

    #[test]
    fn test_nodes_stay_inside_margin() {
        let mut rng = Pcg32::seed_from_u64(5);
        let config = PlannerConfig {
            goal_bias: 0.0,
            ..PlannerConfig::default()
        };
        let mut planner = RrtStar::new(Vec2::new(500.0, 300.0), open_world(), config);
        for _ in 0..300 {
            planner.grow_once(Vec2::new(-1000.0, -1000.0), &mut rng);
        }
        let bounds = WorldBounds::default();
        for node in planner.tree().nodes() {
            assert!(bounds.contains(node.pos));
        }
        assert_tree_consistent(planner.tree());
    }

    #[test]
    fn test_same_seed_same_path() {
        let run = || {
            let mut rng = Pcg32::seed_from_u64(1234);
            let mut planner = RrtStar::new(Vec2::new(50.0, 50.0), open_world(), PlannerConfig::default());
            planner.plan(Vec2::new(700.0, 400.0), 500, &mut rng).path
        };
        assert_eq!(run(), run());
    }
}
