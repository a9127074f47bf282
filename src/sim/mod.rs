//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call per tick, no sleeping or frame pacing
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod geometry;
pub mod level;
pub mod planner;
pub mod pursuer;
pub mod state;
pub mod tick;
pub mod tree;

pub use geometry::{Obstacle, World, WorldBounds, is_point_valid, is_segment_clear};
pub use level::{Collectible, generate_obstacles, spawn_collectibles};
pub use planner::{PlanOutcome, RrtStar};
pub use pursuer::{PursuitAgent, PursuitStatus};
pub use state::{GamePhase, GameState, Player};
pub use tick::{TickInput, tick};
pub use tree::{NodeId, Path, PlanNode, PlanningTree};
