//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable block iteration order (grid order)
//! - No rendering, audio or network dependencies

pub mod collision;
pub mod reward;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod triangle;

pub use collision::{CollisionResult, ContactSide, ball_block_collision};
pub use reward::{RewardWeights, reward_for_tick};
pub use scheduler::{ActionSource, Scheduler, TickReport};
pub use snapshot::{BallView, BlockView, PaddleView, StateSnapshot};
pub use state::{Ball, Block, BlockHit, BlockShape, GameEvent, GameState, Paddle, Rect};
pub use tick::{Action, Steer, TickOutcome, tick};
pub use triangle::Triangle;
