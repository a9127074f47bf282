//! Level layout: obstacle placement and collectible spawning
//!
//! Layouts are drawn from the caller's RNG so a run seed reproduces them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Obstacle, World, footprint};
use crate::consts::COLLECTIBLE_SIZE;
use crate::settings::WorldConfig;

/// Obstacle side lengths are drawn from this range (inclusive)
const OBSTACLE_MIN_SIZE: i32 = 60;
const OBSTACLE_MAX_SIZE: i32 = 120;
/// Gap between obstacles and the world edge
const OBSTACLE_EDGE_PAD: i32 = 20;
/// Obstacle centers must be farther than this from either spawn point
const SPAWN_CLEARANCE: f32 = 200.0;
/// Placed obstacles are inflated by this much when testing new ones
const OBSTACLE_SPACING: f32 = 30.0;
const OBSTACLE_ATTEMPTS: u32 = 500;

const COLLECTIBLE_EDGE_PAD: i32 = 50;
/// Side of the clearance probe around a new collectible
const COLLECTIBLE_PROBE: f32 = 20.0;
const COLLECTIBLE_SPACING: f32 = 80.0;
const COLLECTIBLE_ATTEMPTS: u32 = 100;

/// A pickup worth one point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
}

impl Collectible {
    pub fn new(pos: Vec2) -> Self {
        Self { pos }
    }

    /// Collision box (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        footprint(self.pos, COLLECTIBLE_SIZE)
    }
}

/// Place up to `count` non-overlapping obstacles away from both spawn points
///
/// Gives up after a fixed number of attempts, so fewer obstacles may be returned.
pub fn generate_obstacles<R: Rng + ?Sized>(
    rng: &mut R,
    world: &WorldConfig,
    count: usize,
    spawns: &[Vec2],
) -> Vec<Obstacle> {
    let mut placed: Vec<Obstacle> = Vec::with_capacity(count);
    let width = world.width as i32;
    let height = world.height as i32;

    for _ in 0..OBSTACLE_ATTEMPTS {
        if placed.len() >= count {
            break;
        }

        let w = rng.random_range(OBSTACLE_MIN_SIZE..=OBSTACLE_MAX_SIZE);
        let h = rng.random_range(OBSTACLE_MIN_SIZE..=OBSTACLE_MAX_SIZE);
        let max_x = width - w - OBSTACLE_EDGE_PAD;
        let max_y = height - h - OBSTACLE_EDGE_PAD;
        if max_x < OBSTACLE_EDGE_PAD || max_y < OBSTACLE_EDGE_PAD {
            continue;
        }
        let x = rng.random_range(OBSTACLE_EDGE_PAD..=max_x);
        let y = rng.random_range(OBSTACLE_EDGE_PAD..=max_y);
        let candidate = Obstacle::new(x as f32, y as f32, w as f32, h as f32);

        let center = candidate.center();
        if spawns.iter().any(|s| center.distance(*s) <= SPAWN_CLEARANCE) {
            continue;
        }
        let overlaps = placed.iter().any(|existing| {
            let grown = existing.inflate(OBSTACLE_SPACING);
            candidate.overlaps(grown.min(), grown.max())
        });
        if !overlaps {
            placed.push(candidate);
        }
    }

    log::info!("Placed {}/{} obstacles", placed.len(), count);
    placed
}

/// Add up to `count` collectibles clear of obstacles and spaced from existing ones
pub fn spawn_collectibles<R: Rng + ?Sized>(
    rng: &mut R,
    world: &World,
    collectibles: &mut Vec<Collectible>,
    count: usize,
) {
    let max_x = world.bounds.width as i32 - COLLECTIBLE_EDGE_PAD;
    let max_y = world.bounds.height as i32 - COLLECTIBLE_EDGE_PAD;
    if max_x < COLLECTIBLE_EDGE_PAD || max_y < COLLECTIBLE_EDGE_PAD {
        return;
    }

    for _ in 0..count {
        for _ in 0..COLLECTIBLE_ATTEMPTS {
            let pos = Vec2::new(
                rng.random_range(COLLECTIBLE_EDGE_PAD..=max_x) as f32,
                rng.random_range(COLLECTIBLE_EDGE_PAD..=max_y) as f32,
            );
            let (min, max) = footprint(pos, COLLECTIBLE_PROBE);
            if world.box_hits_obstacle(min, max) {
                continue;
            }
            if collectibles
                .iter()
                .any(|c| c.pos.distance(pos) < COLLECTIBLE_SPACING)
            {
                continue;
            }
            collectibles.push(Collectible::new(pos));
            break;
        }
    }
}
