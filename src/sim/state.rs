//! Game state and core simulation types
//!
//! The whole game is one `GameState` value. Which thread may write which
//! part of it is decided by `session`; nothing in here is shared or global.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::collision::{BlockFace, BorderZone};
use super::geometry::Vector2D;
use crate::settings::Settings;

/// Last direction key the player pressed (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputDirection {
    Left,
    Right,
    Up,
    Down,
    #[default]
    None,
}

/// Where a game currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball in flight
    Playing,
    /// Ball escaped past the paddle
    Lost,
    /// Every block destroyed
    Won,
}

/// Most recently resolved collision, kept for the diagnostic readout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LastCollision {
    #[default]
    None,
    Border(BorderZone),
    Paddle,
    Block(BlockFace),
}

impl fmt::Display for LastCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastCollision::None => write!(f, "None"),
            LastCollision::Border(zone) => write!(f, "Border {zone}"),
            LastCollision::Paddle => write!(f, "Paddle"),
            LastCollision::Block(face) => write!(f, "Block {face} face"),
        }
    }
}

/// Inner edges of the arena border, in board coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ArenaBounds {
    pub fn from_settings(settings: &Settings) -> Self {
        let t = settings.border_thickness;
        Self {
            left: t,
            // The top border line sits one row lower than the board edge
            top: t + 1.0,
            right: settings.board_width - t - 1.0,
            bottom: settings.board_height - t - 1.0,
        }
    }
}

/// Range the paddle center may occupy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleBounds {
    pub min_x: f64,
    pub max_x: f64,
}

impl PaddleBounds {
    pub fn from_settings(settings: &Settings) -> Self {
        let half = settings.paddle_half_width();
        Self {
            min_x: 1.0 + half,
            max_x: settings.board_width - 2.0 - half,
        }
    }
}

/// An axis-aligned destructible block
///
/// Blocks compare (and order) by their endpoint pair, so a set of blocks
/// never holds two blocks covering the same rectangle. The order is
/// row-major: top row first, left to right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Block {
    pub top_left: Vector2D,
    pub bottom_right: Vector2D,
}

impl Block {
    pub fn new(top_left: Vector2D, bottom_right: Vector2D) -> Self {
        debug_assert!(
            top_left.x < bottom_right.x && top_left.y < bottom_right.y,
            "block corners out of order: {top_left} / {bottom_right}"
        );
        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    fn sort_key(&self) -> [f64; 4] {
        [
            self.top_left.y,
            self.top_left.x,
            self.bottom_right.y,
            self.bottom_right.x,
        ]
    }
}

impl Ord for Block {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .iter()
            .zip(other.sort_key().iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Block {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Block {}

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Center of the paddle's top row
    pub position: Vector2D,
    pub last_input: InputDirection,
}

impl Paddle {
    pub fn new(position: Vector2D) -> Self {
        Self {
            position,
            last_input: InputDirection::None,
        }
    }

    /// Move horizontally by `delta_x`, clamped to `bounds`
    pub fn shift(&mut self, delta_x: f64, bounds: PaddleBounds) {
        self.position.x = (self.position.x + delta_x).clamp(bounds.min_x, bounds.max_x);
    }

    /// Apply one key press
    pub fn steer(&mut self, direction: InputDirection, settings: &Settings) {
        self.last_input = direction;
        let delta_x = match direction {
            InputDirection::Left => -settings.paddle_step,
            InputDirection::Right => settings.paddle_step,
            InputDirection::Up | InputDirection::Down | InputDirection::None => return,
        };
        self.shift(delta_x, PaddleBounds::from_settings(settings));
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vector2D,
    /// Position before the current tick's advance (swept collision origin)
    pub prev_pos: Vector2D,
    /// Velocity; its magnitude always equals `speed`
    pub dir: Vector2D,
    pub speed: f64,
    pub radius: f64,
}

impl Ball {
    /// Place a fresh ball just above the paddle, heading straight up
    pub fn serve(paddle: &Paddle, settings: &Settings) -> Self {
        let pos = Vector2D::new(
            paddle.position.x,
            paddle.position.y - settings.paddle_height - 2.0,
        );
        Self {
            pos,
            prev_pos: pos,
            dir: Vector2D::new(0.0, -settings.ball_speed),
            speed: settings.ball_speed,
            radius: settings.ball_radius,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub paddle: Paddle,
    pub ball: Ball,
    /// Live blocks
    pub blocks: BTreeSet<Block>,
    pub lost: bool,
    pub won: bool,
    /// Blocks destroyed this game
    pub score: u32,
    /// Ticks simulated since the last reset
    pub ticks: u64,
    pub last_collision: LastCollision,
}

impl GameState {
    pub fn new(settings: &Settings) -> Self {
        let paddle = Paddle::new(settings.paddle_start);
        let mut state = Self {
            paddle,
            ball: Ball::serve(&paddle, settings),
            blocks: BTreeSet::new(),
            lost: false,
            won: false,
            score: 0,
            ticks: 0,
            last_collision: LastCollision::None,
        };
        state.reset(settings);
        state
    }

    /// Start a new game in place: fresh block grid, paddle and ball at their
    /// start positions, terminal flags cleared
    pub fn reset(&mut self, settings: &Settings) {
        self.blocks = seed_blocks(settings);
        self.paddle = Paddle::new(settings.paddle_start);
        self.ball = Ball::serve(&self.paddle, settings);
        self.lost = false;
        self.won = false;
        self.score = 0;
        self.ticks = 0;
        self.last_collision = LastCollision::None;
    }

    /// Move the paddle by `delta_x`, clamped to `bounds`
    pub fn move_paddle(&mut self, delta_x: f64, bounds: PaddleBounds) {
        self.paddle.shift(delta_x, bounds);
    }

    pub fn phase(&self) -> GamePhase {
        if self.lost {
            GamePhase::Lost
        } else if self.won {
            GamePhase::Won
        } else {
            GamePhase::Playing
        }
    }

    pub fn is_over(&self) -> bool {
        self.lost || self.won
    }
}

/// Lay out the block grid described by `settings`
pub fn seed_blocks(settings: &Settings) -> BTreeSet<Block> {
    let mut blocks = BTreeSet::new();
    let size = Vector2D::new(settings.block_width, settings.block_height);

    let mut y = settings.block_origin.y;
    while y < settings.block_limit.y {
        let mut x = settings.block_origin.x;
        while x < settings.block_limit.x {
            let top_left = Vector2D::new(x, y);
            blocks.insert(Block::new(top_left, top_left + size));
            x += settings.block_spacing.x;
        }
        y += settings.block_spacing.y;
    }

    blocks
}
