//! Property tests over whole-game behavior

use arkanoid_engine::config::BlockShapeKind;
use arkanoid_engine::sim::{Action, GameState, Scheduler, StateSnapshot, tick};
use arkanoid_engine::{Session, SimConfig};
use proptest::prelude::*;

/// A small grid keeps per-case work low while still letting the ball reach blocks
fn small_config(shape: BlockShapeKind, seed: u64) -> SimConfig {
    let mut config = SimConfig {
        seed,
        ..SimConfig::default()
    };
    config.blocks.rows = 3;
    config.blocks.cols = 6;
    config.blocks.shape = shape;
    config
}

fn shape_strategy() -> impl Strategy<Value = BlockShapeKind> {
    prop_oneof![Just(BlockShapeKind::Rect), Just(BlockShapeKind::Triangle)]
}

/// Runs of (move code, how many ticks to hold it)
fn script_strategy() -> impl Strategy<Value = Vec<(i64, u32)>> {
    prop::collection::vec((-1i64..=3, 1u32..400), 1..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn paddle_stays_in_bounds(seed in any::<u64>(), script in script_strategy()) {
        let config = small_config(BlockShapeKind::Rect, seed);
        let mut state = GameState::new(&config);
        let half = config.paddle.width / 2.0;

        for (code, ticks) in script {
            let action = Action::from_code(code).unwrap();
            for _ in 0..ticks {
                tick(&mut state, &action, &config);
                let x = state.paddle.pos.x;
                prop_assert!(x >= half - 1e-6 && x <= 1.0 - half + 1e-6, "paddle x {x}");
                prop_assert!(state.paddle.pos.y <= config.paddle.baseline_y + 1e-6);
            }
        }
    }

    #[test]
    fn game_rules_are_monotonic(
        seed in any::<u64>(),
        shape in shape_strategy(),
        script in script_strategy(),
    ) {
        let config = small_config(shape, seed);
        let mut state = GameState::new(&config);

        for (code, ticks) in script {
            let action = Action::from_code(code).unwrap();
            for _ in 0..ticks {
                let before = state.clone();
                tick(&mut state, &action, &config);

                prop_assert!(state.score >= before.score);
                prop_assert!(state.lives <= before.lives);
                prop_assert!(!(state.game_over && state.victory));
                if before.is_terminal() {
                    prop_assert_eq!(state.time_ticks, before.time_ticks);
                }

                for (old, new) in before.blocks.iter().zip(&state.blocks) {
                    prop_assert!(new.hits_remaining <= old.hits_remaining);
                    prop_assert!(!new.active || old.active, "block reactivated");
                    prop_assert_eq!(new.active, new.hits_remaining > 0);
                }

                prop_assert!(state.ball.vel.is_finite());
                prop_assert!(state.ball.vel.length() <= config.ball.max_speed + 1e-4);
            }
        }
    }

    #[test]
    fn scheduler_tick_count_matches_capped_accumulator(
        samples in prop::collection::vec(0.0f64..300.0, 1..40),
    ) {
        let config = small_config(BlockShapeKind::Rect, 0);
        let mut state = GameState::new(&config);
        let mut scheduler = Scheduler::from_config(&config);

        let cap = config.timing.max_accumulated_ms;
        let dt = config.timing.tick_ms;
        let mut acc = 0.0f64;

        for elapsed in samples {
            acc = (acc + elapsed).min(cap);
            let expected = (acc / dt).floor();
            acc -= expected * dt;

            let ran = scheduler.advance(elapsed, &mut state, &config, &mut Action::IDLE).len();
            prop_assert_eq!(ran as f64, expected);
        }
    }

    #[test]
    fn reset_is_idempotent(seed in any::<u64>(), script in script_strategy()) {
        let config = small_config(BlockShapeKind::Triangle, seed);
        let mut session = Session::new(config.clone()).unwrap();

        let mut scripted = Scheduler::from_config(&config);
        let mut state = GameState::new(&config);
        for (code, ticks) in script {
            let mut action = Action::from_code(code).unwrap();
            scripted.advance(f64::from(ticks), &mut state, &config, &mut action);
        }

        session.frame(150.0);
        session.reset();
        let once = session.snapshot();
        session.reset();
        prop_assert_eq!(&session.snapshot(), &once);
        prop_assert_eq!(once, StateSnapshot::from(&GameState::new(&config)));

        state.reset(&config);
        prop_assert_eq!(StateSnapshot::from(&state), session.snapshot());
    }
}
