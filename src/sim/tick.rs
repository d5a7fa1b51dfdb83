//! Simulation tick
//!
//! Advances the ball by one variable timestep and resolves whatever it hit.
//! Order within a tick is fixed: snapshot, advance, border, paddle, blocks.

use super::collision::{
    BlockFace, BorderZone, CollisionSource, classify_border, intersects_paddle,
    test_block_overlap,
};
use super::geometry::{Vector2D, normalize};
use super::state::{ArenaBounds, Block, GameState, LastCollision};
use crate::settings::Settings;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickResult {
    /// Border zone the ball ended up in (`None` when fully inside)
    pub border: BorderZone,
    pub paddle_hit: bool,
    /// Destroyed block and the face that was struck
    pub block_hit: Option<(Block, BlockFace)>,
}

impl Default for TickResult {
    fn default() -> Self {
        Self {
            border: BorderZone::None,
            paddle_hit: false,
            block_hit: None,
        }
    }
}

/// Apply the direction flip (or game loss) for a collision in `zone`
pub fn resolve_collision(state: &mut GameState, zone: BorderZone, source: CollisionSource) {
    let dir = &mut state.ball.dir;
    match zone {
        BorderZone::Left | BorderZone::Right => dir.x = -dir.x,
        BorderZone::Top | BorderZone::TopLeft | BorderZone::TopRight => dir.y = -dir.y,
        BorderZone::Bottom | BorderZone::BottomLeft | BorderZone::BottomRight => match source {
            // Escaped past the paddle
            CollisionSource::Border => state.lost = true,
            CollisionSource::Block => dir.y = -dir.y,
        },
        BorderZone::None => {}
    }
}

/// Whether the ball is still moving into the wall of `zone`.
///
/// A ball that overshot a wall on a long tick stays in the border zone for a
/// few ticks after the flip; it must not be flipped back out again.
fn heading_into(zone: BorderZone, dir: Vector2D) -> bool {
    match zone {
        BorderZone::Left => dir.x < 0.0,
        BorderZone::Right => dir.x > 0.0,
        BorderZone::Top | BorderZone::TopLeft | BorderZone::TopRight => dir.y < 0.0,
        BorderZone::Bottom | BorderZone::BottomLeft | BorderZone::BottomRight => true,
        BorderZone::None => false,
    }
}

/// Send the ball back up off the paddle and speed it up.
///
/// The rebound angle depends only on where the ball landed: straight up at
/// the paddle center, down to `min_theta_deg` at either end, leaning toward
/// the side that was struck. The incoming direction is ignored.
pub fn handle_paddle_collision(state: &mut GameState, settings: &Settings) {
    let paddle_x = state.paddle.position.x;
    let ball_x = state.ball.pos.x;

    let distance_from_center = (paddle_x - ball_x).abs();
    let normalized_distance = (distance_from_center / settings.paddle_half_width()).min(1.0);
    let min_theta = settings.min_theta_deg;
    let theta = ((1.0 - normalized_distance) * (90.0 - min_theta) + min_theta).to_radians();

    let x_sign = if ball_x < paddle_x { -1.0 } else { 1.0 };
    let outgoing = normalize(Vector2D::new(x_sign * theta.cos(), -theta.sin()));

    state.ball.speed *= settings.speed_increase_factor;
    state.ball.dir = outgoing * state.ball.speed;
    state.last_collision = LastCollision::Paddle;
}

/// Destroy the first live block the ball hit this tick, if any.
///
/// At most one block goes per tick, even if the ball overlaps several.
pub fn check_and_handle_block_collision(state: &mut GameState) -> Option<(Block, BlockFace)> {
    let ball = state.ball;
    let (block, face) = state.blocks.iter().find_map(|block| {
        test_block_overlap(block, ball.prev_pos, ball.pos, ball.radius).map(|face| (*block, face))
    })?;

    state.blocks.remove(&block);
    state.score += 1;
    state.last_collision = LastCollision::Block(face);
    if state.blocks.is_empty() {
        state.won = true;
    }

    resolve_collision(state, face.as_zone(), CollisionSource::Block);
    Some((block, face))
}

/// Advance the game by `delta_time` seconds.
///
/// Does nothing once the game is lost or won.
pub fn advance_tick(state: &mut GameState, delta_time: f64, settings: &Settings) -> TickResult {
    let mut result = TickResult::default();
    if state.is_over() {
        return result;
    }
    debug_assert!(delta_time >= 0.0, "negative delta_time {delta_time}");

    state.ticks += 1;

    // Move ball
    state.ball.prev_pos = state.ball.pos;
    state.ball.pos += state.ball.dir * delta_time;

    // Border
    let bounds = ArenaBounds::from_settings(settings);
    result.border = classify_border(state.ball.pos, state.ball.radius, &bounds);
    if heading_into(result.border, state.ball.dir) {
        state.last_collision = LastCollision::Border(result.border);
        resolve_collision(state, result.border, CollisionSource::Border);
    }
    if state.lost {
        return result;
    }

    // Paddle
    if intersects_paddle(state, settings) {
        handle_paddle_collision(state, settings);
        result.paddle_hit = true;
    }

    // Blocks
    result.block_hit = check_and_handle_block_collision(state);

    result
}
