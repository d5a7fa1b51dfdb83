//! Block Breaker - a ball-and-paddle arcade simulation core
//!
//! Core modules:
//! - `sim`: Simulation (geometry, collisions, game state, tick)
//! - `session`: Threaded game loop, restart handling, render notifications
//! - `settings`: Tunable configuration

pub mod session;
pub mod settings;
pub mod sim;

pub use session::{Outcome, Session, SessionEvent, Snapshot};
pub use settings::{Settings, SettingsError};

/// Default configuration constants
pub mod consts {
    /// Target simulation rate
    pub const TICK_RATE_HZ: f64 = 30.0;
    /// Nominal timestep at the target rate
    pub const SIM_DT: f64 = 1.0 / TICK_RATE_HZ;

    /// Board dimensions
    pub const BOARD_WIDTH: f64 = 102.0;
    pub const BOARD_HEIGHT: f64 = 100.0;
    pub const BORDER_THICKNESS: f64 = 2.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f64 = 14.0;
    pub const PADDLE_HEIGHT: f64 = 1.0;
    pub const PADDLE_STEP: f64 = 2.0;

    /// Ball defaults
    pub const BALL_RADIUS: f64 = 0.5;
    pub const BALL_START_SPEED: f64 = 10.0;
    /// Shallowest paddle rebound (degrees above horizontal)
    pub const MIN_THETA_DEG: f64 = 20.0;
    /// Speed boost when ball hits paddle (multiplicative)
    pub const PADDLE_BOOST: f64 = 1.05;
}
