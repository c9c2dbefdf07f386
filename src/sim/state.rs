//! Game state and core simulation types
//!
//! Everything lives in normalized field coordinates: x and y in [0, 1],
//! y growing downward. Display size never reaches this module.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::triangle::Triangle;
use crate::config::{BlockShapeKind, SimConfig};
use crate::consts::*;

/// Discrete things that happened during a tick, for presentation only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    BallLaunched,
    Jumped,
    WallHit,
    PaddleHit,
    /// Block took a hit but survived
    BlockChipped { index: usize, hits_remaining: u32 },
    BlockDestroyed { index: usize, points: u64 },
    LifeLost { lives_left: u32 },
    GameOver,
    Victory,
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// x is the horizontal center, y the top edge
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    /// Resting y; the paddle is grounded at or below it
    pub baseline_y: f32,
}

impl Paddle {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: Vec2::new(0.5, config.paddle.baseline_y),
            vel: Vec2::ZERO,
            width: config.paddle.width,
            height: config.paddle.height,
            baseline_y: config.paddle.baseline_y,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn is_grounded(&self) -> bool {
        self.pos.y >= self.baseline_y
    }

    /// Top-left corner of the paddle rectangle
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.pos.x - self.half_width(), self.pos.y)
    }

    /// Integrate one step of motion under gravity and clamp to the field
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.pos += self.vel * dt;
        self.vel.y += gravity * dt;

        let half = self.half_width();
        self.pos.x = self.pos.x.clamp(half, FIELD_MAX - half);
        self.pos.y = self.pos.y.clamp(FIELD_MIN, self.baseline_y);
        if self.is_grounded() {
            self.vel.y = 0.0;
        }
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Nominal speed used for launches and as the zero-speed fallback
    pub speed: f32,
    pub launched: bool,
}

impl Ball {
    pub fn new(config: &SimConfig, paddle: &Paddle) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: config.ball.radius,
            speed: config.ball.speed,
            launched: false,
        };
        ball.ride(paddle, config.ball.passenger_offset);
        ball
    }

    /// Pin the ball above the paddle (passenger state)
    pub fn ride(&mut self, paddle: &Paddle, offset: f32) {
        self.pos = Vec2::new(paddle.pos.x, paddle.pos.y - offset);
    }

    /// Return to passenger state after a lost life
    pub fn make_passenger(&mut self, paddle: &Paddle, offset: f32) {
        self.launched = false;
        self.vel = Vec2::ZERO;
        self.ride(paddle, offset);
    }

    /// Leave the paddle at `angle` radians from vertical with the given speed
    pub fn launch(&mut self, angle: f32, speed: f32) {
        let (sin, cos) = angle.sin_cos();
        self.vel = Vec2::new(speed * sin, -speed * cos);
        self.launched = true;
    }
}

/// Axis-aligned rectangle, `min` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }
}

/// Block geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockShape {
    Rect(Rect),
    Triangle(Triangle),
}

impl BlockShape {
    /// Axis-aligned bounds, for rendering and broad-phase checks
    pub fn bounds(&self) -> Rect {
        match self {
            BlockShape::Rect(rect) => *rect,
            BlockShape::Triangle(tri) => tri.bounds(),
        }
    }
}

/// Result of hitting a block once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockHit {
    Chipped { hits_remaining: u32 },
    Destroyed,
}

/// A destructible block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub shape: BlockShape,
    pub hits_remaining: u32,
    pub max_hits: u32,
    pub active: bool,
}

impl Block {
    pub fn new(shape: BlockShape, hits: u32) -> Self {
        Self {
            shape,
            hits_remaining: hits,
            max_hits: hits,
            active: true,
        }
    }

    /// Take one hit. Deactivates exactly once, when hits reach zero.
    pub fn hit(&mut self) -> BlockHit {
        self.hits_remaining = self.hits_remaining.saturating_sub(1);
        if self.hits_remaining == 0 {
            self.active = false;
            BlockHit::Destroyed
        } else {
            BlockHit::Chipped {
                hits_remaining: self.hits_remaining,
            }
        }
    }
}

/// Lay out the block grid row by row, left to right
pub fn build_block_grid(config: &SimConfig, rng: &mut Pcg32) -> Vec<Block> {
    let layout = &config.blocks;
    let (cell_w, cell_h) = layout.cell_size();
    let mut blocks = Vec::with_capacity((layout.rows * layout.cols) as usize);

    for row in 0..layout.rows {
        let hits = layout.hits_for_row(row);
        for col in 0..layout.cols {
            let x = layout.side_margin + col as f32 * (cell_w + layout.padding);
            let y = layout.top + row as f32 * (cell_h + layout.padding);
            let shape = match layout.shape {
                BlockShapeKind::Rect => BlockShape::Rect(Rect::new(x, y, cell_w, cell_h)),
                BlockShapeKind::Triangle => {
                    let rotation = TRIANGLE_ROTATIONS[rng.random_range(0..TRIANGLE_ROTATIONS.len())];
                    // Circumradius fits the cell at every rotation
                    let size = cell_w.min(cell_h) * 3f32.sqrt() / 2.0;
                    let center = Vec2::new(x + cell_w / 2.0, y + cell_h / 2.0);
                    BlockShape::Triangle(Triangle::equilateral(center, size, rotation))
                }
            };
            blocks.push(Block::new(shape, hits));
        }
    }

    blocks
}

/// Complete game state (the aggregate root)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the current episode was built from
    pub seed: u64,
    pub rng: Pcg32,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Fixed iteration order, never reordered during an episode
    pub blocks: Vec<Block>,
    pub score: u64,
    pub lives: u32,
    pub game_over: bool,
    pub victory: bool,
    /// Ticks simulated since the last reset
    pub time_ticks: u64,
}

impl GameState {
    /// Create a new game state from the config's seed
    pub fn new(config: &SimConfig) -> Self {
        Self::with_seed(config, config.seed)
    }

    /// Create a new game state with an explicit seed
    pub fn with_seed(config: &SimConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let blocks = build_block_grid(config, &mut rng);
        let paddle = Paddle::new(config);
        let ball = Ball::new(config, &paddle);
        Self {
            seed,
            rng,
            paddle,
            ball,
            blocks,
            score: 0,
            lives: config.scoring.initial_lives,
            game_over: false,
            victory: false,
            time_ticks: 0,
        }
    }

    /// Rebuild everything from the current seed
    pub fn reset(&mut self, config: &SimConfig) {
        *self = Self::with_seed(config, self.seed);
    }

    pub fn is_terminal(&self) -> bool {
        self.game_over || self.victory
    }

    pub fn active_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.blocks.shape = BlockShapeKind::Rect;
        config
    }

    #[test]
    fn test_new_state() {
        let config = SimConfig::default();
        let state = GameState::new(&config);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.blocks.len(), 12 * 24);
        assert!(!state.ball.launched);
        assert!(!state.is_terminal());
        assert!((state.ball.pos.y - (state.paddle.pos.y - config.ball.passenger_offset)).abs() < 1e-6);
    }

    #[test]
    fn test_block_hit_deactivates_once() {
        let mut block = Block::new(BlockShape::Rect(Rect::new(0.1, 0.1, 0.05, 0.02)), 2);
        assert_eq!(block.hit(), BlockHit::Chipped { hits_remaining: 1 });
        assert!(block.active);
        assert_eq!(block.hit(), BlockHit::Destroyed);
        assert!(!block.active);
        assert_eq!(block.hits_remaining, 0);
    }

    #[test]
    fn test_grid_stays_inside_field() {
        for config in [SimConfig::default(), rect_config()] {
            let state = GameState::new(&config);
            for block in &state.blocks {
                let b = block.shape.bounds();
                assert!(b.min.x >= 0.0 && b.max().x <= 1.0, "{b:?}");
                assert!(b.min.y >= 0.0 && b.max().y < config.paddle.baseline_y, "{b:?}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let config = SimConfig::default();
        let a = GameState::with_seed(&config, 42);
        let b = GameState::with_seed(&config, 42);
        assert_eq!(a.blocks, b.blocks);
    }

    #[test]
    fn test_paddle_clamped_to_field() {
        let config = SimConfig::default();
        let mut paddle = Paddle::new(&config);
        paddle.vel.x = -100.0;
        paddle.integrate(0.1, config.paddle.gravity);
        assert_eq!(paddle.pos.x, paddle.half_width());
        paddle.vel.x = 100.0;
        paddle.integrate(0.1, config.paddle.gravity);
        assert_eq!(paddle.pos.x, 1.0 - paddle.half_width());
    }

    #[test]
    fn test_paddle_lands_after_jump() {
        let config = SimConfig::default();
        let mut paddle = Paddle::new(&config);
        paddle.vel.y = -config.paddle.jump_speed;
        let dt = config.tick_seconds();
        paddle.integrate(dt, config.paddle.gravity);
        assert!(!paddle.is_grounded());
        for _ in 0..2_000 {
            paddle.integrate(dt, config.paddle.gravity);
        }
        assert!(paddle.is_grounded());
        assert_eq!(paddle.vel.y, 0.0);
    }
}
