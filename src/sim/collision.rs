//! Collision detection
//!
//! Classifies where the ball touches the arena border, the paddle, or a
//! block. Nothing here mutates state; `tick` applies the responses.
//!
//! The ball is a circle given by its center and radius. Border and paddle
//! checks are axis-aligned comparisons; block checks are swept, testing the
//! segment the ball travelled this tick against each block edge so a fast
//! ball cannot tunnel through a thin block.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Vector2D, segments_intersect};
use super::state::{ArenaBounds, Block, GameState};
use crate::settings::Settings;

/// Region of the arena border the ball overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderZone {
    Left,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    /// Fully inside the arena
    None,
}

impl fmt::Display for BorderZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BorderZone::Left => "Left",
            BorderZone::TopLeft => "Top Left",
            BorderZone::Top => "Top",
            BorderZone::TopRight => "Top Right",
            BorderZone::Right => "Right",
            BorderZone::BottomRight => "Bottom Right",
            BorderZone::Bottom => "Bottom",
            BorderZone::BottomLeft => "Bottom Left",
            BorderZone::None => "None",
        };
        f.write_str(label)
    }
}

/// Face of a block that the ball struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    /// Underside, ball arriving from below
    Bottom,
    /// Upper face, ball arriving from above
    Top,
    /// Left face, ball arriving from the left
    Left,
    /// Right face, ball arriving from the right
    Right,
}

impl BlockFace {
    /// The border zone whose bounce matches a hit on this face.
    ///
    /// A block face is seen from the ball: striking a block's underside is
    /// the same bounce as striking the arena's top wall.
    ///
    /// | face   | zone   |
    /// |--------|--------|
    /// | Bottom | Top    |
    /// | Top    | Bottom |
    /// | Left   | Right  |
    /// | Right  | Left   |
    pub fn as_zone(self) -> BorderZone {
        match self {
            BlockFace::Bottom => BorderZone::Top,
            BlockFace::Top => BorderZone::Bottom,
            BlockFace::Left => BorderZone::Right,
            BlockFace::Right => BorderZone::Left,
        }
    }
}

impl fmt::Display for BlockFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BlockFace::Bottom => "Bottom",
            BlockFace::Top => "Top",
            BlockFace::Left => "Left",
            BlockFace::Right => "Right",
        };
        f.write_str(label)
    }
}

/// What the ball collided with.
///
/// The same `BorderZone` means different things per source: `Bottom` off the
/// border ends the game, `Bottom` off a block is an ordinary bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionSource {
    Border,
    Block,
}

/// Classify which border zone a ball at `pos` overlaps.
///
/// Corners win over single edges when both axes are out of bounds.
pub fn classify_border(pos: Vector2D, radius: f64, bounds: &ArenaBounds) -> BorderZone {
    let out_left = pos.x - radius < bounds.left;
    let out_right = pos.x + radius > bounds.right;
    let out_top = pos.y - radius < bounds.top;
    let out_bottom = pos.y + radius > bounds.bottom;

    match (out_left, out_right, out_top, out_bottom) {
        (true, _, true, _) => BorderZone::TopLeft,
        (true, _, _, true) => BorderZone::BottomLeft,
        (_, true, true, _) => BorderZone::TopRight,
        (_, true, _, true) => BorderZone::BottomRight,
        (true, _, _, _) => BorderZone::Left,
        (_, true, _, _) => BorderZone::Right,
        (_, _, _, true) => BorderZone::Bottom,
        (_, _, true, _) => BorderZone::Top,
        _ => BorderZone::None,
    }
}

/// Whether the ball is landing on the paddle this tick.
///
/// Only a descending ball can hit the paddle. Vertically the test is swept:
/// the band covered by the ball between its previous and current position
/// must reach the paddle's top row. Horizontally the ball's extent must
/// overlap the paddle's.
pub fn intersects_paddle(state: &GameState, settings: &Settings) -> bool {
    let ball = &state.ball;
    if ball.dir.y <= 0.0 {
        return false;
    }

    let paddle = state.paddle.position;
    let paddle_top = paddle.y - settings.paddle_height;

    let sweep_top = ball.prev_pos.y.min(ball.pos.y) - ball.radius;
    let sweep_bottom = ball.prev_pos.y.max(ball.pos.y) + ball.radius;
    if sweep_bottom < paddle_top || sweep_top > paddle.y {
        return false;
    }

    let half = settings.paddle_half_width();
    ball.pos.x + ball.radius > paddle.x - half && ball.pos.x - ball.radius < paddle.x + half
}

/// Test the ball's movement from `prev` to `pos` against one block.
///
/// Blocks outside the ball's inflated bounding square are rejected first.
/// Touching that square is not an overlap. Survivors get each edge tested
/// against the travelled segment, stretched by `radius` toward that edge so
/// the ball's surface rather than its center makes contact. Edges are tried
/// bottom, top, left, right; the first hit wins.
pub fn test_block_overlap(
    block: &Block,
    prev: Vector2D,
    pos: Vector2D,
    radius: f64,
) -> Option<BlockFace> {
    let tl = block.top_left;
    let br = block.bottom_right;

    let d1x = (tl.x - radius) - pos.x;
    let d1y = (tl.y - radius) - pos.y;
    let d2x = pos.x - (br.x + radius);
    let d2y = pos.y - (br.y + radius);
    if d1x >= 0.0 || d1y >= 0.0 || d2x >= 0.0 || d2y >= 0.0 {
        return None;
    }

    let vertical = Vector2D::new(0.0, radius);
    let horizontal = Vector2D::new(radius, 0.0);
    let bl = Vector2D::new(tl.x, br.y);
    let tr = Vector2D::new(br.x, tl.y);

    if segments_intersect(bl, br, prev, pos - vertical) {
        return Some(BlockFace::Bottom);
    }
    if segments_intersect(tl, tr, prev, pos + vertical) {
        return Some(BlockFace::Top);
    }
    if segments_intersect(tl, bl, prev, pos + horizontal) {
        return Some(BlockFace::Left);
    }
    if segments_intersect(tr, br, prev, pos - horizontal) {
        return Some(BlockFace::Right);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds() -> ArenaBounds {
        ArenaBounds::from_settings(&Settings::default())
    }

    fn v(x: f64, y: f64) -> Vector2D {
        Vector2D::new(x, y)
    }

    fn block() -> Block {
        Block::new(v(10.0, 10.0), v(15.0, 12.0))
    }

    #[test]
    fn test_center_is_inside() {
        assert_eq!(classify_border(v(50.0, 50.0), 0.5, &bounds()), BorderZone::None);
    }

    #[test]
    fn test_single_edges() {
        let b = bounds();
        assert_eq!(classify_border(v(2.2, 50.0), 0.5, &b), BorderZone::Left);
        assert_eq!(classify_border(v(98.8, 50.0), 0.5, &b), BorderZone::Right);
        assert_eq!(classify_border(v(50.0, 3.2), 0.5, &b), BorderZone::Top);
        assert_eq!(classify_border(v(50.0, 96.8), 0.5, &b), BorderZone::Bottom);
    }

    #[test]
    fn test_radius_matters() {
        let b = bounds();
        // Center inside, surface outside
        assert_eq!(classify_border(v(2.4, 50.0), 0.5, &b), BorderZone::Left);
        assert_eq!(classify_border(v(2.4, 50.0), 0.0, &b), BorderZone::None);
    }

    #[test]
    fn test_corners_take_priority() {
        let b = bounds();
        assert_eq!(classify_border(v(2.0, 3.0), 0.5, &b), BorderZone::TopLeft);
        assert_eq!(classify_border(v(99.0, 3.0), 0.5, &b), BorderZone::TopRight);
        assert_eq!(classify_border(v(2.0, 97.0), 0.5, &b), BorderZone::BottomLeft);
        assert_eq!(classify_border(v(99.0, 97.0), 0.5, &b), BorderZone::BottomRight);
    }

    #[test]
    fn test_face_to_zone_mapping() {
        assert_eq!(BlockFace::Bottom.as_zone(), BorderZone::Top);
        assert_eq!(BlockFace::Top.as_zone(), BorderZone::Bottom);
        assert_eq!(BlockFace::Left.as_zone(), BorderZone::Right);
        assert_eq!(BlockFace::Right.as_zone(), BorderZone::Left);
    }

    #[test]
    fn test_zone_labels() {
        assert_eq!(BorderZone::TopLeft.to_string(), "Top Left");
        assert_eq!(BorderZone::None.to_string(), "None");
    }

    #[test]
    fn test_corner_touch_with_zero_radius_is_not_overlap() {
        let b = block();
        assert_eq!(test_block_overlap(&b, b.top_left, b.top_left, 0.0), None);
        assert_eq!(test_block_overlap(&b, v(9.0, 9.0), b.top_left, 0.0), None);
    }

    #[test]
    fn test_far_block_rejected() {
        assert_eq!(test_block_overlap(&block(), v(40.0, 40.0), v(40.0, 39.0), 0.5), None);
    }

    #[test]
    fn test_hit_from_below() {
        // Moving up, top of the ball crosses the underside at y = 12
        let face = test_block_overlap(&block(), v(12.0, 13.2), v(12.0, 12.4), 0.5);
        assert_eq!(face, Some(BlockFace::Bottom));
    }

    #[test]
    fn test_hit_from_above() {
        let face = test_block_overlap(&block(), v(12.0, 8.8), v(12.0, 9.6), 0.5);
        assert_eq!(face, Some(BlockFace::Top));
    }

    #[test]
    fn test_hit_from_left() {
        let face = test_block_overlap(&block(), v(8.8, 11.0), v(9.7, 11.0), 0.5);
        assert_eq!(face, Some(BlockFace::Left));
    }

    #[test]
    fn test_hit_from_right() {
        let face = test_block_overlap(&block(), v(16.2, 11.0), v(15.3, 11.0), 0.5);
        assert_eq!(face, Some(BlockFace::Right));
    }

    #[test]
    fn test_ball_resting_inside_reports_nothing() {
        // Inside the block, not crossing any edge this tick
        assert_eq!(test_block_overlap(&block(), v(12.0, 11.0), v(12.5, 11.0), 0.1), None);
    }

    #[test]
    fn test_paddle_only_when_descending() {
        let settings = Settings::default();
        let mut state = GameState::new(&settings);
        state.ball.pos = v(47.0, 87.2);
        state.ball.prev_pos = v(47.0, 86.8);

        state.ball.dir = v(0.0, 10.0);
        assert!(intersects_paddle(&state, &settings));

        state.ball.dir = v(0.0, -10.0);
        assert!(!intersects_paddle(&state, &settings));
    }

    #[test]
    fn test_paddle_horizontal_extent() {
        let settings = Settings::default();
        let mut state = GameState::new(&settings);
        state.ball.dir = v(0.0, 10.0);
        state.ball.prev_pos = v(0.0, 86.8);
        state.ball.pos = v(0.0, 87.2);

        // Paddle spans 40..54; the ball's radius reaches past the end
        state.ball.pos.x = 54.3;
        assert!(intersects_paddle(&state, &settings));
        state.ball.pos.x = 54.6;
        assert!(!intersects_paddle(&state, &settings));
    }

    #[test]
    fn test_paddle_swept_catches_fast_ball() {
        let settings = Settings::default();
        let mut state = GameState::new(&settings);
        state.ball.dir = v(0.0, 200.0);
        // Jumped from well above the paddle to below it in one tick
        state.ball.prev_pos = v(47.0, 80.0);
        state.ball.pos = v(47.0, 92.0);
        assert!(intersects_paddle(&state, &settings));
    }

    #[test]
    fn test_ball_below_paddle_is_not_a_hit() {
        let settings = Settings::default();
        let mut state = GameState::new(&settings);
        state.ball.dir = v(0.0, 10.0);
        state.ball.prev_pos = v(47.0, 92.0);
        state.ball.pos = v(47.0, 92.4);
        assert!(!intersects_paddle(&state, &settings));
    }

    proptest! {
        #[test]
        fn prop_inside_inset_bounds_is_none(
            x in 2.5f64..98.5,
            y in 3.5f64..96.5,
        ) {
            prop_assert_eq!(classify_border(v(x, y), 0.5, &bounds()), BorderZone::None);
        }

        #[test]
        fn prop_top_left_corner_region(
            dx in 0.0f64..0.5,
            dy in 0.0f64..0.5,
        ) {
            let b = bounds();
            let pos = v(b.left + 0.5 - dx - 0.01, b.top + 0.5 - dy - 0.01);
            prop_assert_eq!(classify_border(pos, 0.5, &b), BorderZone::TopLeft);
        }
    }
}
