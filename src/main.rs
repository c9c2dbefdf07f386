//! Arkanoid Engine headless runner
//!
//! Drives a session from a ~60 Hz timer. With `ARKANOID_AGENT_ADDR` set, a
//! remote agent steers the paddle; otherwise the runner only taps launch and
//! lets the ball play out. Episodes restart automatically on a terminal
//! state. `ARKANOID_CONFIG` points at a JSON config file; `RUST_LOG` sets
//! the log level.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use arkanoid_engine::control::Key;
use arkanoid_engine::frontend::{LogPresenter, Presenter, Viewport};
use arkanoid_engine::sim::GameEvent;
use arkanoid_engine::{Session, SimConfig};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let config_path = std::env::var_os("ARKANOID_CONFIG").map(PathBuf::from);
    let config = SimConfig::load_or_default(config_path.as_deref());

    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot start session: {}", e);
            std::process::exit(1);
        }
    };

    match std::env::var("ARKANOID_AGENT_ADDR") {
        Ok(addr) => {
            log::info!("Connecting to agent at {}", addr);
            session.control().connect_tcp(addr);
        }
        Err(_) => log::info!("No agent configured, running under local control"),
    }

    let mut presenter = LogPresenter::new();
    presenter.set_viewport(Viewport::new(800, 800));

    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last = Instant::now();
    let mut episodes = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                log::info!("Shutting down after {} episodes", episodes);
                break;
            }
        }

        if !session.control().is_remote() && !session.state().ball.launched {
            let input = session.control().local_input();
            input.key_down(Key::Enter);
            input.key_up(Key::Enter);
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        let reports = session.frame(elapsed_ms);
        let events: Vec<GameEvent> = reports.iter().flat_map(|r| r.events.iter().copied()).collect();
        presenter.present(&session.snapshot(), &events);

        if session.is_terminal() {
            episodes += 1;
            let next_seed = session.state().seed.wrapping_add(1);
            log::info!("Episode {} finished, restarting with seed {}", episodes, next_seed);
            session.reset_with_seed(next_seed);
        }
    }
}
