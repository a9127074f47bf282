//! Validity oracle for axis-aligned obstacle fields
//!
//! Agents are treated as square footprints centered on their position. A
//! position is valid when the footprint stays inside the world margin and
//! overlaps no obstacle. Segment clearance is approximated by sampling.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::WorldConfig;

/// An axis-aligned rectangular obstacle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Grow the rectangle by `amount` in total on each axis, keeping its center
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount / 2.0,
            self.y - amount / 2.0,
            self.w + amount,
            self.h + amount,
        )
    }

    /// Strict overlap test against the box `[min, max]`; shared edges do not count
    #[inline]
    pub fn overlaps(&self, min: Vec2, max: Vec2) -> bool {
        rects_overlap(self.min(), self.max(), min, max)
    }
}

/// Strict overlap of two axis-aligned boxes given as min/max corners
#[inline]
pub fn rects_overlap(a_min: Vec2, a_max: Vec2, b_min: Vec2, b_max: Vec2) -> bool {
    a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
}

/// Footprint box of a square agent of side `size` centered on `center`
#[inline]
pub fn footprint(center: Vec2, size: f32) -> (Vec2, Vec2) {
    let half = Vec2::splat(size / 2.0);
    (center - half, center + half)
}

/// World extents plus the agent footprint used for validity checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub agent_size: f32,
}

impl WorldBounds {
    /// Whether `pos` lies in `[margin, bound - margin]` on both axes
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.margin
            && pos.x <= self.width - self.margin
            && pos.y >= self.margin
            && pos.y <= self.height - self.margin
    }

    /// Clamp `pos` into the margin band
    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.clamp(self.margin, self.width - self.margin),
            pos.y.clamp(self.margin, self.height - self.margin),
        )
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        WorldConfig::default().into()
    }
}

impl From<WorldConfig> for WorldBounds {
    fn from(cfg: WorldConfig) -> Self {
        Self {
            width: cfg.width,
            height: cfg.height,
            margin: cfg.margin,
            agent_size: cfg.agent_size,
        }
    }
}

/// Whether an agent centered at `pos` is inside the bounds and clear of all obstacles
pub fn is_point_valid(pos: Vec2, obstacles: &[Obstacle], bounds: &WorldBounds) -> bool {
    if !bounds.contains(pos) {
        return false;
    }
    let (min, max) = footprint(pos, bounds.agent_size);
    !obstacles.iter().any(|obs| obs.overlaps(min, max))
}

/// Sampled clearance check of the straight segment `a -> b`
///
/// Tests the fractions `i / steps` for `i` in `[0, steps)`. The end point itself
/// is not sampled, and an obstacle thinner than the sample spacing can be missed.
pub fn is_segment_clear(
    a: Vec2,
    b: Vec2,
    obstacles: &[Obstacle],
    bounds: &WorldBounds,
    steps: u32,
) -> bool {
    let delta = b - a;
    (0..steps).all(|i| {
        let t = i as f32 / steps as f32;
        is_point_valid(a + delta * t, obstacles, bounds)
    })
}

/// Read-only view of the static environment shared by every agent
///
/// Cloning is cheap: the obstacle set is reference counted and never mutated.
#[derive(Debug, Clone)]
pub struct World {
    pub bounds: WorldBounds,
    obstacles: Arc<[Obstacle]>,
}

impl World {
    pub fn new(bounds: WorldBounds, obstacles: impl Into<Arc<[Obstacle]>>) -> Self {
        Self {
            bounds,
            obstacles: obstacles.into(),
        }
    }

    /// World with no obstacles
    pub fn empty(bounds: WorldBounds) -> Self {
        Self::new(bounds, Vec::<Obstacle>::new())
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn is_point_valid(&self, pos: Vec2) -> bool {
        is_point_valid(pos, &self.obstacles, &self.bounds)
    }

    #[inline]
    pub fn is_segment_clear(&self, a: Vec2, b: Vec2, steps: u32) -> bool {
        is_segment_clear(a, b, &self.obstacles, &self.bounds, steps)
    }

    /// Whether a box overlaps any obstacle (bounds are not checked)
    pub fn box_hits_obstacle(&self, min: Vec2, max: Vec2) -> bool {
        self.obstacles.iter().any(|obs| obs.overlaps(min, max))
    }

    /// Uniformly random point anywhere inside the world rectangle
    pub fn sample_point<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.random_range(0.0..=self.bounds.width),
            rng.random_range(0.0..=self.bounds.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds() -> WorldBounds {
        WorldBounds {
            width: 1000.0,
            height: 600.0,
            margin: 15.0,
            agent_size: 30.0,
        }
    }

    #[test]
    fn test_point_inside_obstacle_is_invalid() {
        let obstacles = [Obstacle::new(100.0, 100.0, 60.0, 60.0)];
        assert!(!is_point_valid(Vec2::new(115.0, 115.0), &obstacles, &bounds()));
        assert!(is_point_valid(Vec2::new(500.0, 500.0), &obstacles, &bounds()));
    }

    #[test]
    fn test_point_outside_margin_is_invalid() {
        assert!(!is_point_valid(Vec2::new(10.0, 300.0), &[], &bounds()));
        assert!(!is_point_valid(Vec2::new(500.0, 590.0), &[], &bounds()));
        assert!(is_point_valid(Vec2::new(15.0, 15.0), &[], &bounds()));
        assert!(is_point_valid(Vec2::new(985.0, 585.0), &[], &bounds()));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        // Footprint [70, 100] touches the obstacle's left edge at x = 100
        let obstacles = [Obstacle::new(100.0, 100.0, 60.0, 60.0)];
        assert!(is_point_valid(Vec2::new(85.0, 130.0), &obstacles, &bounds()));
        assert!(!is_point_valid(Vec2::new(85.5, 130.0), &obstacles, &bounds()));
    }

    #[test]
    fn test_segment_through_obstacle_is_blocked() {
        let obstacles = [Obstacle::new(400.0, 250.0, 100.0, 100.0)];
        assert!(!is_segment_clear(
            Vec2::new(350.0, 300.0),
            Vec2::new(550.0, 300.0),
            &obstacles,
            &bounds(),
            10
        ));
    }

    #[test]
    fn test_segment_clear_of_obstacle() {
        let obstacles = [Obstacle::new(400.0, 250.0, 100.0, 100.0)];
        assert!(is_segment_clear(
            Vec2::new(100.0, 100.0),
            Vec2::new(900.0, 100.0),
            &obstacles,
            &bounds(),
            10
        ));
    }

    #[test]
    fn test_thin_obstacle_can_slip_between_samples() {
        // Samples land every 80 units; a 2-unit sliver between them is missed
        let obstacles = [Obstacle::new(158.0, 0.0, 2.0, 600.0)];
        let world = World::new(bounds(), obstacles.to_vec());
        assert!(world.is_segment_clear(Vec2::new(100.0, 300.0), Vec2::new(900.0, 300.0), 10));
        assert!(!world.is_segment_clear(Vec2::new(100.0, 300.0), Vec2::new(900.0, 300.0), 100));
    }

    #[test]
    fn test_inflate_keeps_center() {
        let obs = Obstacle::new(10.0, 20.0, 40.0, 60.0);
        let big = obs.inflate(30.0);
        assert_eq!(big.center(), obs.center());
        assert_eq!(big.w, 70.0);
        assert_eq!(big.h, 90.0);
    }

    #[test]
    fn test_clamp_into_margin() {
        let b = bounds();
        assert_eq!(b.clamp(Vec2::new(-50.0, 700.0)), Vec2::new(15.0, 585.0));
    }

    proptest! {
        #[test]
        fn valid_points_are_within_bounds(x in -100.0f32..1100.0, y in -100.0f32..700.0) {
            let b = bounds();
            let p = Vec2::new(x, y);
            prop_assert_eq!(is_point_valid(p, &[], &b), b.contains(p));
        }

        #[test]
        fn point_valid_iff_no_overlap(x in 15.0f32..985.0, y in 15.0f32..585.0) {
            let obs = Obstacle::new(400.0, 250.0, 100.0, 100.0);
            let p = Vec2::new(x, y);
            let (min, max) = footprint(p, 30.0);
            prop_assert_eq!(is_point_valid(p, &[obs], &bounds()), !obs.overlaps(min, max));
        }

        #[test]
        fn clear_segment_has_valid_start(
            ax in 15.0f32..985.0, ay in 15.0f32..585.0,
            bx in 15.0f32..985.0, by in 15.0f32..585.0,
        ) {
            let obs = [Obstacle::new(400.0, 250.0, 100.0, 100.0)];
            let a = Vec2::new(ax, ay);
            if is_segment_clear(a, Vec2::new(bx, by), &obs, &bounds(), 10) {
                prop_assert!(is_point_valid(a, &obs, &bounds()));
            }
        }
    }
}
