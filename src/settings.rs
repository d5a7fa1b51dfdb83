//! Game settings
//!
//! Every tunable of the simulation lives here. Defaults reproduce the
//! classic 102x100 terminal board; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::sim::Vector2D;

/// Settings loading/validation errors
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value that would break the simulation
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Slowest accepted simulation clock
pub const MIN_TICK_RATE_HZ: f64 = 1.0;
/// Largest block grid `seed_blocks` will lay out
pub const MAX_BLOCKS: f64 = 10_000.0;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub board_width: f64,
    pub board_height: f64,
    /// Border inset on each side of the board
    pub border_thickness: f64,

    // === Paddle ===
    pub paddle_width: f64,
    pub paddle_height: f64,
    /// Horizontal distance moved per Left/Right input
    pub paddle_step: f64,
    pub paddle_start: Vector2D,

    // === Ball ===
    /// Speed at the start of every game
    pub ball_speed: f64,
    pub ball_radius: f64,
    /// Shallowest rebound angle off the paddle edge (degrees)
    pub min_theta_deg: f64,
    /// Multiplier applied to ball speed on every paddle hit
    pub speed_increase_factor: f64,

    // === Blocks ===
    pub block_width: f64,
    pub block_height: f64,
    /// First row / column origin
    pub block_origin: Vector2D,
    /// Distance between consecutive rows / columns
    pub block_spacing: Vector2D,
    /// Rows and columns stop before these coordinates
    pub block_limit: Vector2D,

    // === Clock ===
    pub tick_rate_hz: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_width: consts::BOARD_WIDTH,
            board_height: consts::BOARD_HEIGHT,
            border_thickness: consts::BORDER_THICKNESS,

            paddle_width: consts::PADDLE_WIDTH,
            paddle_height: consts::PADDLE_HEIGHT,
            paddle_step: consts::PADDLE_STEP,
            paddle_start: Vector2D::new(47.0, 88.0),

            ball_speed: consts::BALL_START_SPEED,
            ball_radius: consts::BALL_RADIUS,
            min_theta_deg: consts::MIN_THETA_DEG,
            speed_increase_factor: consts::PADDLE_BOOST,

            block_width: 5.0,
            block_height: 2.0,
            block_origin: Vector2D::new(4.0, 6.0),
            block_spacing: Vector2D::new(8.0, 6.0),
            block_limit: Vector2D::new(97.0, 13.0),

            tick_rate_hz: consts::TICK_RATE_HZ,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&contents)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason })
        }

        let scalars = [
            self.board_width,
            self.board_height,
            self.border_thickness,
            self.paddle_width,
            self.paddle_height,
            self.paddle_step,
            self.ball_speed,
            self.ball_radius,
            self.min_theta_deg,
            self.speed_increase_factor,
            self.block_width,
            self.block_height,
            self.tick_rate_hz,
        ];
        let vectors = [
            self.paddle_start,
            self.block_origin,
            self.block_spacing,
            self.block_limit,
        ];
        if !scalars.iter().all(|value| value.is_finite())
            || !vectors.iter().all(|value| value.is_finite())
        {
            return invalid("settings", "every number must be finite");
        }

        if self.board_width <= 0.0 || self.board_height <= 0.0 {
            return invalid("board_width/board_height", "must be positive");
        }
        if self.border_thickness < 0.0 {
            return invalid("border_thickness", "must not be negative");
        }
        if self.paddle_width <= 0.0 || self.paddle_height <= 0.0 {
            return invalid("paddle_width/paddle_height", "must be positive");
        }
        if self.paddle_width + 3.0 > self.board_width {
            return invalid("paddle_width", "paddle does not fit inside the arena");
        }
        if self.ball_speed <= 0.0 {
            return invalid("ball_speed", "must be positive");
        }
        if self.ball_radius < 0.0 {
            return invalid("ball_radius", "must not be negative");
        }
        if !(self.min_theta_deg > 0.0 && self.min_theta_deg < 90.0) {
            return invalid("min_theta_deg", "must lie strictly between 0 and 90");
        }
        if self.speed_increase_factor <= 1.0 {
            return invalid("speed_increase_factor", "must be greater than 1");
        }
        if self.block_width <= 0.0 || self.block_height <= 0.0 {
            return invalid("block_width/block_height", "must be positive");
        }
        if self.block_spacing.x < self.block_width || self.block_spacing.y < self.block_height {
            return invalid("block_spacing", "must be at least the block size");
        }
        let columns = ((self.block_limit.x - self.block_origin.x) / self.block_spacing.x).ceil();
        let rows = ((self.block_limit.y - self.block_origin.y) / self.block_spacing.y).ceil();
        if columns.max(0.0) * rows.max(0.0) > MAX_BLOCKS {
            return invalid("block_limit", "block grid is too large");
        }
        if self.tick_rate_hz < MIN_TICK_RATE_HZ {
            return invalid("tick_rate_hz", "must be at least 1 Hz");
        }
        Ok(())
    }

    /// Target wall-clock time between two simulation ticks.
    ///
    /// Rates below `MIN_TICK_RATE_HZ` (or NaN) run at the floor rate.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(MIN_TICK_RATE_HZ))
    }

    /// Half the paddle width
    #[inline]
    pub fn paddle_half_width(&self) -> f64 {
        self.paddle_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.board_width, 102.0);
        assert_eq!(settings.paddle_start, Vector2D::new(47.0, 88.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "ball_speed": 12.5, "tick_rate_hz": 60.0 }"#)
            .expect("valid settings");
        assert_eq!(settings.ball_speed, 12.5);
        assert_eq!(settings.tick_rate_hz, 60.0);
        assert_eq!(settings.paddle_width, Settings::default().paddle_width);
    }

    #[test]
    fn test_vector_fields_parse() {
        let settings =
            Settings::from_json(r#"{ "paddle_start": [40.0, 80.0] }"#).expect("valid settings");
        assert_eq!(settings.paddle_start, Vector2D::new(40.0, 80.0));
    }

    #[test]
    fn test_rejects_speed_factor_not_above_one() {
        let err = Settings::from_json(r#"{ "speed_increase_factor": 1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "speed_increase_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_min_theta() {
        assert!(Settings::from_json(r#"{ "min_theta_deg": 90.0 }"#).is_err());
        assert!(Settings::from_json(r#"{ "min_theta_deg": 0.0 }"#).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load("/nonexistent/block-breaker/settings.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let settings = Settings {
            ball_speed: f64::INFINITY,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            block_origin: Vector2D::new(f64::NAN, 6.0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        assert!(Settings::from_json(r#"{ "block_limit": [1e309, 13.0] }"#).is_err());
    }

    #[test]
    fn test_rejects_tick_rate_below_floor() {
        let err = Settings::from_json(r#"{ "tick_rate_hz": 1e-30 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "tick_rate_hz",
                ..
            }
        ));
    }

    #[test]
    fn test_tick_interval_never_panics() {
        let settings = Settings {
            tick_rate_hz: 1e-30,
            ..Default::default()
        };
        assert_eq!(settings.tick_interval(), std::time::Duration::from_secs(1));

        let settings = Settings {
            tick_rate_hz: f64::NAN,
            ..Default::default()
        };
        assert_eq!(settings.tick_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_spacing_smaller_than_block() {
        let err = Settings::from_json(r#"{ "block_spacing": [1e-300, 6.0] }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "block_spacing",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_oversized_block_grid() {
        let err = Settings::from_json(r#"{ "block_limit": [1e12, 13.0] }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "block_limit",
                ..
            }
        ));
    }

    #[test]
    fn test_tick_interval() {
        let settings = Settings {
            tick_rate_hz: 50.0,
            ..Default::default()
        };
        assert!((settings.tick_interval().as_secs_f64() - 0.02).abs() < 1e-6);
    }
}
