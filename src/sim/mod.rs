//! Simulation core
//!
//! All gameplay logic lives here. This module is pure and single-threaded:
//! - Time comes in as an explicit `delta_time`, never from a clock
//! - Blocks iterate in a stable order (row-major)
//! - No rendering, input or threading dependencies
//!
//! `session` wraps it for concurrent use.

pub mod collision;
pub mod geometry;
pub mod state;
pub mod tick;

pub use collision::{
    BlockFace, BorderZone, CollisionSource, classify_border, intersects_paddle,
    test_block_overlap,
};
pub use geometry::{Orientation, Vector2D, magnitude, normalize, orientation, segments_intersect};
pub use state::{
    ArenaBounds, Ball, Block, GamePhase, GameState, InputDirection, LastCollision, Paddle,
    PaddleBounds, seed_blocks,
};
pub use tick::{
    TickResult, advance_tick, check_and_handle_block_collision, handle_paddle_collision,
    resolve_collision,
};
