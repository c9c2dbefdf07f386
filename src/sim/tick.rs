//! Fixed timestep simulation tick
//!
//! Advances the game by exactly one step: apply the pending action,
//! integrate motion, resolve collisions, then apply scoring and lifecycle
//! rules. Rendering and sound react to the returned events only.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{
    ball_block_collision, ball_rect_collision, circle_rect_overlap, paddle_bounce, reflect_walls,
    resolve_contact, speed_up,
};
use super::reward::reward_for_tick;
use super::state::{BlockHit, GameEvent, GameState, Rect};
use crate::config::SimConfig;
use crate::consts::*;

/// Horizontal steering intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steer {
    Left,
    Stop,
    Right,
}

impl Steer {
    pub fn sign(self) -> f32 {
        match self {
            Steer::Left => -1.0,
            Steer::Stop => 0.0,
            Steer::Right => 1.0,
        }
    }
}

/// Paddle control intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// New steering; `None` keeps the paddle's current horizontal velocity
    pub steer: Option<Steer>,
    /// Jump (only takes effect while grounded)
    pub jump: bool,
    /// Launch the ball (only takes effect while it rides the paddle)
    pub launch: bool,
}

impl Action {
    pub const IDLE: Action = Action {
        steer: None,
        jump: false,
        launch: false,
    };

    pub fn steer(steer: Steer) -> Self {
        Self {
            steer: Some(steer),
            ..Self::IDLE
        }
    }

    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::IDLE
        }
    }

    pub fn launch() -> Self {
        Self {
            launch: true,
            ..Self::IDLE
        }
    }

    /// Decode a wire move code: -1 left, 0 stop, 1 right, 2 jump, 3 launch
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::steer(Steer::Left)),
            0 => Some(Self::steer(Steer::Stop)),
            1 => Some(Self::steer(Steer::Right)),
            2 => Some(Self::jump()),
            3 => Some(Self::launch()),
            _ => None,
        }
    }
}

/// What one tick produced besides the mutated state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub reward: f32,
    pub events: Vec<GameEvent>,
}

/// Advance the game state by one fixed timestep.
///
/// Terminal states are frozen: the call is a no-op until the state is reset.
pub fn tick(state: &mut GameState, action: &Action, config: &SimConfig) -> TickOutcome {
    if state.is_terminal() {
        return TickOutcome::default();
    }

    let dt = config.tick_seconds();
    let mut events = Vec::new();

    state.time_ticks += 1;

    apply_action(state, action, config, &mut events);
    integrate(state, config, dt);

    if state.ball.launched {
        resolve_collisions(state, config, &mut events);
    }

    apply_lifecycle(state, config, &mut events);

    let reward = reward_for_tick(state, &events, &config.reward);
    TickOutcome { reward, events }
}

fn apply_action(state: &mut GameState, action: &Action, config: &SimConfig, events: &mut Vec<GameEvent>) {
    if let Some(steer) = action.steer {
        state.paddle.vel.x = steer.sign() * config.paddle.speed;
    }

    if action.jump && state.paddle.is_grounded() {
        state.paddle.vel.y = -config.paddle.jump_speed;
        events.push(GameEvent::Jumped);
    }

    if action.launch && !state.ball.launched {
        let spread = config.ball.launch_spread_deg.to_radians();
        let angle = if spread > 0.0 {
            state.rng.random_range(-spread..=spread)
        } else {
            0.0
        };
        let speed = state.ball.speed + state.paddle.vel.x.abs() * config.ball.launch_paddle_factor;
        state.ball.launch(angle, speed.min(config.ball.max_speed));
        events.push(GameEvent::BallLaunched);
    }
}

fn integrate(state: &mut GameState, config: &SimConfig, dt: f32) {
    state.paddle.integrate(dt, config.paddle.gravity);

    if state.ball.launched {
        state.ball.pos += state.ball.vel * dt;
    } else {
        state.ball.ride(&state.paddle, config.ball.passenger_offset);
    }
}

fn resolve_collisions(state: &mut GameState, config: &SimConfig, events: &mut Vec<GameEvent>) {
    let ball = &mut state.ball;

    if reflect_walls(&mut ball.pos, &mut ball.vel, ball.radius) {
        events.push(GameEvent::WallHit);
    }

    // Paddle: only a descending ball bounces, so a fresh bounce never re-triggers.
    // Contacts below the paddle's midline hit its side or underside instead.
    let paddle = &state.paddle;
    let paddle_rect = Rect {
        min: paddle.min(),
        size: glam::Vec2::new(paddle.width, paddle.height),
    };
    if ball.vel.y > 0.0 && circle_rect_overlap(ball.pos, ball.radius, &paddle_rect) {
        if ball.pos.y < paddle_rect.center().y {
            ball.pos.y = paddle.pos.y - ball.radius;
            ball.vel = paddle_bounce(ball.pos, ball.vel, paddle, &config.bounce, &config.ball);
        } else {
            let contact = ball_rect_collision(ball.pos, ball.radius, &paddle_rect);
            resolve_contact(&mut ball.pos, &mut ball.vel, &contact);
        }
        events.push(GameEvent::PaddleHit);
    }

    // Blocks: only the first intersecting block in grid order is resolved
    for (index, block) in state.blocks.iter_mut().enumerate() {
        if !block.active {
            continue;
        }
        let contact = ball_block_collision(ball.pos, ball.radius, &block.shape);
        if !contact.hit {
            continue;
        }

        resolve_contact(&mut ball.pos, &mut ball.vel, &contact);
        match block.hit() {
            BlockHit::Destroyed => {
                let points = u64::from(block.max_hits) * config.scoring.points_per_hit;
                state.score += points;
                ball.vel = speed_up(ball.vel, config.ball.speed_up_per_block, config.ball.max_speed);
                events.push(GameEvent::BlockDestroyed { index, points });
            }
            BlockHit::Chipped { hits_remaining } => {
                events.push(GameEvent::BlockChipped { index, hits_remaining });
            }
        }
        break;
    }
}

fn apply_lifecycle(state: &mut GameState, config: &SimConfig, events: &mut Vec<GameEvent>) {
    if state.ball.launched && state.ball.pos.y > FIELD_MAX {
        state.lives = state.lives.saturating_sub(1);
        events.push(GameEvent::LifeLost {
            lives_left: state.lives,
        });

        if state.lives == 0 {
            state.game_over = true;
            events.push(GameEvent::GameOver);
            log::info!("Game over with score {}", state.score);
        } else {
            state
                .ball
                .make_passenger(&state.paddle, config.ball.passenger_offset);
        }
    }

    // Defeat takes precedence; victory is only checked on a live board
    if !state.game_over && state.active_blocks() == 0 {
        state.victory = true;
        events.push(GameEvent::Victory);
        log::info!("Victory with score {}", state.score);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::config::BlockShapeKind;
    use crate::sim::state::{Block, BlockShape};

    fn rect_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.blocks.shape = BlockShapeKind::Rect;
        config
    }

    fn launched_state(config: &SimConfig, pos: Vec2, vel: Vec2) -> GameState {
        let mut state = GameState::new(config);
        state.ball.launched = true;
        state.ball.pos = pos;
        state.ball.vel = vel;
        state
    }

    #[test]
    fn test_tick_launch() {
        let config = SimConfig::default();
        let mut state = GameState::new(&config);

        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert!(!state.ball.launched);
        assert!(outcome.reward < 0.0, "stalling is penalized");

        let outcome = tick(&mut state, &Action::launch(), &config);
        assert!(state.ball.launched);
        assert!(state.ball.vel.y < 0.0);
        assert!(outcome.events.contains(&GameEvent::BallLaunched));
    }

    #[test]
    fn test_passenger_follows_paddle() {
        let config = SimConfig::default();
        let mut state = GameState::new(&config);
        for _ in 0..100 {
            tick(&mut state, &Action::steer(Steer::Right), &config);
        }
        assert!(state.paddle.pos.x > 0.5);
        assert_eq!(state.ball.pos.x, state.paddle.pos.x);
    }

    #[test]
    fn test_steer_is_held_until_changed() {
        let config = SimConfig::default();
        let mut state = GameState::new(&config);
        tick(&mut state, &Action::steer(Steer::Left), &config);
        let x = state.paddle.pos.x;
        tick(&mut state, &Action::IDLE, &config);
        assert!(state.paddle.pos.x < x);
        tick(&mut state, &Action::steer(Steer::Stop), &config);
        let x = state.paddle.pos.x;
        tick(&mut state, &Action::IDLE, &config);
        assert_eq!(state.paddle.pos.x, x);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let config = SimConfig::default();
        let mut state = GameState::new(&config);
        let outcome = tick(&mut state, &Action::jump(), &config);
        assert!(outcome.events.contains(&GameEvent::Jumped));
        assert!(!state.paddle.is_grounded());
        let outcome = tick(&mut state, &Action::jump(), &config);
        assert!(!outcome.events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_wall_bounce() {
        let config = SimConfig::default();
        let r = config.ball.radius;
        let mut state = launched_state(&config, Vec2::new(r, 0.7), Vec2::new(-2.0, 1.0));
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert_eq!(state.ball.vel, Vec2::new(2.0, 1.0));
        assert!(outcome.events.contains(&GameEvent::WallHit));
    }

    #[test]
    fn test_life_loss_and_recovery() {
        let config = SimConfig::default();
        let mut state = launched_state(&config, Vec2::new(0.5, 1.0), Vec2::new(0.0, 0.4));
        state.lives = 2;
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert_eq!(state.lives, 1);
        assert!(!state.game_over);
        assert!(!state.ball.launched);
        assert_eq!(state.ball.pos.x, state.paddle.pos.x);
        assert!(outcome.events.contains(&GameEvent::LifeLost { lives_left: 1 }));
        assert!(outcome.reward < -1.0);
    }

    #[test]
    fn test_defeat() {
        let config = SimConfig::default();
        let mut state = launched_state(&config, Vec2::new(0.5, 1.0), Vec2::new(0.0, 0.4));
        state.lives = 1;
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert_eq!(state.lives, 0);
        assert!(state.game_over);
        assert!(!state.victory);
        assert!(outcome.events.contains(&GameEvent::GameOver));

        // Frozen until reset
        let before = state.clone();
        let outcome = tick(&mut state, &Action::launch(), &config);
        assert_eq!(outcome, TickOutcome::default());
        assert_eq!(state.ball, before.ball);
        assert_eq!(state.time_ticks, before.time_ticks);
    }

    #[test]
    fn test_victory_on_last_block() {
        let config = rect_config();
        let mut state = launched_state(&config, Vec2::new(0.5, 0.3), Vec2::new(0.0, -0.4));
        state.blocks = vec![Block::new(
            BlockShape::Rect(Rect::new(0.45, 0.27, 0.1, 0.02)),
            1,
        )];
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert!(state.victory);
        assert!(!state.game_over);
        assert_eq!(state.score, config.scoring.points_per_hit);
        assert!(outcome.events.contains(&GameEvent::Victory));
        assert!(outcome.reward > 5.0);
    }

    #[test]
    fn test_only_first_block_resolved() {
        let config = rect_config();
        let mut state = launched_state(&config, Vec2::new(0.5, 0.3), Vec2::new(0.0, -0.4));
        // Two adjacent blocks both touching the ball
        state.blocks = vec![
            Block::new(BlockShape::Rect(Rect::new(0.45, 0.27, 0.05, 0.02)), 1),
            Block::new(BlockShape::Rect(Rect::new(0.50, 0.27, 0.05, 0.02)), 1),
            Block::new(BlockShape::Rect(Rect::new(0.1, 0.1, 0.05, 0.02)), 1),
        ];
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert!(!state.blocks[0].active);
        assert!(state.blocks[1].active);
        let destroyed = outcome
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BlockDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
        assert!(state.ball.vel.y > 0.0);
    }

    #[test]
    fn test_multi_hit_block_chips() {
        let config = rect_config();
        let mut state = launched_state(&config, Vec2::new(0.5, 0.3), Vec2::new(0.0, -0.4));
        state.blocks = vec![Block::new(
            BlockShape::Rect(Rect::new(0.45, 0.27, 0.1, 0.02)),
            3,
        )];
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert_eq!(state.blocks[0].hits_remaining, 2);
        assert!(state.blocks[0].active);
        assert_eq!(state.score, 0);
        assert!(outcome.events.contains(&GameEvent::BlockChipped {
            index: 0,
            hits_remaining: 2
        }));
    }

    #[test]
    fn test_paddle_bounce_in_tick() {
        let config = SimConfig::default();
        let y = config.paddle.baseline_y - config.ball.radius + 0.0001;
        let mut state = launched_state(&config, Vec2::new(0.5, y), Vec2::new(0.0, 0.4));
        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert!(outcome.events.contains(&GameEvent::PaddleHit));
        assert!(state.ball.vel.y < 0.0);
    }

    #[test]
    fn test_side_contact_with_airborne_paddle_does_not_snap_on_top() {
        let config = SimConfig::default();
        let mut state = launched_state(&config, Vec2::new(0.605, 0.515), Vec2::new(-0.1, 0.4));
        // Paddle in mid-air, rect spans y 0.50..0.52 and x 0.40..0.60
        state.paddle.pos = Vec2::new(0.5, 0.5);
        state.paddle.vel = Vec2::ZERO;

        let outcome = tick(&mut state, &Action::IDLE, &config);
        assert!(outcome.events.contains(&GameEvent::PaddleHit));
        assert!(state.ball.pos.y > state.paddle.pos.y, "ball teleported above paddle");
        assert!(state.ball.pos.x >= 0.6 + config.ball.radius - 1e-5);
        assert!(state.ball.vel.x > 0.0);
        assert!(state.ball.vel.y > 0.0);
    }

    #[test]
    fn test_determinism() {
        let config = SimConfig::default();
        let mut a = GameState::with_seed(&config, 99_999);
        let mut b = GameState::with_seed(&config, 99_999);
        let script = [
            Action::steer(Steer::Left),
            Action::launch(),
            Action::steer(Steer::Right),
            Action::jump(),
            Action::IDLE,
        ];
        for i in 0..5_000 {
            let action = script[i % script.len()];
            let ra = tick(&mut a, &action, &config);
            let rb = tick(&mut b, &action, &config);
            assert_eq!(ra, rb);
        }
        assert_eq!(a.ball, b.ball);
        assert_eq!(a.paddle, b.paddle);
        assert_eq!(a.blocks, b.blocks);
        assert_eq!(a.score, b.score);
    }
}
