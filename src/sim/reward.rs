//! Per-tick reward for agent training
//!
//! Recomputed from each tick's resulting state and events; never stored in
//! the game state.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};

/// Reward term magnitudes. Signs are part of the contract, sizes are tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RewardWeights {
    /// Applied on the tick a life is lost (negative)
    pub life_lost: f32,
    /// Applied on the tick the last block falls (positive)
    pub victory: f32,
    /// Applied on the tick the last life is lost (negative)
    pub defeat: f32,
    /// Applied while the ball climbs away from the paddle (positive)
    pub paddle_return: f32,
    /// Vertical distance from the paddle that counts as "near"
    pub return_window: f32,
    /// Applied per destroyed block (positive)
    pub block_destroyed: f32,
    /// Applied every tick the ball rides the paddle (negative)
    pub idle: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            life_lost: -5.0,
            victory: 10.0,
            defeat: -10.0,
            paddle_return: 0.5,
            return_window: 0.02,
            block_destroyed: 1.0,
            idle: -0.01,
        }
    }
}

/// Sum of the independent reward terms for one tick
pub fn reward_for_tick(state: &GameState, events: &[GameEvent], weights: &RewardWeights) -> f32 {
    let mut reward = 0.0;

    for event in events {
        reward += match event {
            GameEvent::LifeLost { .. } => weights.life_lost,
            GameEvent::GameOver => weights.defeat,
            GameEvent::Victory => weights.victory,
            GameEvent::BlockDestroyed { .. } => weights.block_destroyed,
            _ => 0.0,
        };
    }

    let ball = &state.ball;
    if ball.launched
        && ball.vel.y < 0.0
        && (ball.pos.y - state.paddle.pos.y).abs() < weights.return_window
    {
        reward += weights.paddle_return;
    }

    if !ball.launched && !state.is_terminal() {
        reward += weights.idle;
    }

    reward
}
