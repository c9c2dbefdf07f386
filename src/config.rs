//! Simulation configuration
//!
//! One immutable value handed to the simulation at construction. A new
//! configuration means a new session; nothing mutates it in place.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::reward::RewardWeights;

/// Errors raised while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Scheduler timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Fixed tick size (ms)
    pub tick_ms: f64,
    /// Accumulator cap (ms)
    pub max_accumulated_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            max_accumulated_ms: MAX_ACCUMULATED_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaddleConfig {
    pub width: f32,
    pub height: f32,
    /// Resting y of the paddle's top edge
    pub baseline_y: f32,
    /// Horizontal speed while steering (units/s)
    pub speed: f32,
    /// Initial upward speed of a jump (units/s)
    pub jump_speed: f32,
    /// Downward acceleration while airborne (units/s²)
    pub gravity: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            width: 0.2,
            height: 0.02,
            baseline_y: 0.9,
            speed: 0.5,
            jump_speed: 0.3,
            gravity: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BallConfig {
    pub radius: f32,
    /// Nominal speed at launch (units/s)
    pub speed: f32,
    pub max_speed: f32,
    /// Distance above the paddle top while riding as a passenger
    pub passenger_offset: f32,
    /// Launch direction is drawn within ± this angle from vertical (degrees)
    pub launch_spread_deg: f32,
    /// Fraction of paddle |vx| added to launch speed
    pub launch_paddle_factor: f32,
    /// Speed gained per destroyed block (units/s)
    pub speed_up_per_block: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 0.01,
            speed: 0.4,
            max_speed: 1.2,
            passenger_offset: 0.05,
            launch_spread_deg: 30.0,
            launch_paddle_factor: 0.05,
            speed_up_per_block: 0.008,
        }
    }
}

/// Paddle bounce response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BounceConfig {
    pub max_angle_deg: f32,
    /// Fraction of paddle vx added to ball vx
    pub paddle_velocity_blend: f32,
    /// Fraction of paddle upward speed added to ball speed
    pub jump_boost_factor: f32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            max_angle_deg: MAX_BOUNCE_ANGLE_DEG,
            paddle_velocity_blend: 0.3,
            jump_boost_factor: 0.5,
        }
    }
}

/// Block shape used when laying out the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockShapeKind {
    Rect,
    #[default]
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockLayout {
    pub rows: u32,
    pub cols: u32,
    pub shape: BlockShapeKind,
    /// Gap between the side walls and the grid
    pub side_margin: f32,
    /// y of the top edge of the first row
    pub top: f32,
    /// Total height occupied by all rows
    pub region_height: f32,
    pub padding: f32,
    /// Hits needed by the hardest (top) row
    pub max_hits: u32,
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 24,
            shape: BlockShapeKind::Triangle,
            side_margin: 0.02,
            top: 0.05,
            region_height: 0.45,
            padding: 0.004,
            max_hits: 5,
        }
    }
}

impl BlockLayout {
    /// Cell width and height for the configured grid
    pub fn cell_size(&self) -> (f32, f32) {
        let cols = self.cols.max(1) as f32;
        let rows = self.rows.max(1) as f32;
        let w = (FIELD_MAX - 2.0 * self.side_margin - (cols - 1.0) * self.padding) / cols;
        let h = (self.region_height - (rows - 1.0) * self.padding) / rows;
        (w, h)
    }

    /// Hit count for a row; the top row is the toughest
    pub fn hits_for_row(&self, row: u32) -> u32 {
        let rows = self.rows.max(1);
        let from_bottom = rows - 1 - row.min(rows - 1);
        (1 + from_bottom * self.max_hits / rows).clamp(1, self.max_hits.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub points_per_hit: u64,
    pub initial_lives: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_hit: 10,
            initial_lives: INITIAL_LIVES,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    /// Seed for block rotations and launch angles
    pub seed: u64,
    pub timing: TimingConfig,
    pub paddle: PaddleConfig,
    pub ball: BallConfig,
    pub bounce: BounceConfig,
    pub blocks: BlockLayout,
    pub scoring: ScoringConfig,
    pub reward: RewardWeights,
}

impl SimConfig {
    /// Parse and validate a JSON document (missing fields take defaults)
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from a file if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default simulation config");
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded simulation config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default simulation config");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.timing.tick_ms > 0.0) {
            return invalid("timing.tickMs must be > 0");
        }
        if self.timing.max_accumulated_ms < self.timing.tick_ms {
            return invalid("timing.maxAccumulatedMs must be >= timing.tickMs");
        }
        if !(self.paddle.width > 0.0 && self.paddle.width < FIELD_MAX) || !(self.paddle.height > 0.0) {
            return invalid("paddle size must be positive and narrower than the field");
        }
        if !(self.paddle.baseline_y > 0.0 && self.paddle.baseline_y < FIELD_MAX) {
            return invalid("paddle.baselineY must lie inside the field");
        }
        if !(self.ball.radius > 0.0) || !(self.ball.speed > 0.0) {
            return invalid("ball radius and speed must be > 0");
        }
        if self.ball.max_speed < self.ball.speed {
            return invalid("ball.maxSpeed must be >= ball.speed");
        }
        if !(self.bounce.max_angle_deg > 0.0 && self.bounce.max_angle_deg < 90.0) {
            return invalid("bounce.maxAngleDeg must be in (0, 90)");
        }
        if self.blocks.rows > 0 && self.blocks.cols > 0 {
            let (w, h) = self.blocks.cell_size();
            if !(w > 0.0 && h > 0.0) {
                return invalid("block layout does not fit the field");
            }
            if self.blocks.top + self.blocks.region_height >= self.paddle.baseline_y {
                return invalid("block region overlaps the paddle");
            }
        }
        if self.blocks.max_hits == 0 {
            return invalid("blocks.maxHits must be >= 1");
        }
        if self.scoring.initial_lives == 0 {
            return invalid("scoring.initialLives must be >= 1");
        }
        Ok(())
    }

    /// Tick length in seconds, as used by the integrator
    pub fn tick_seconds(&self) -> f32 {
        (self.timing.tick_ms / 1000.0) as f32
    }
}
