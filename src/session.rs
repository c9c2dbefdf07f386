//! Session layer
//!
//! Owns one game and everything that drives it. The frame loop reports
//! elapsed time and gets back the ticks that ran; it decides what to do
//! about terminal states (restart, end screen, tell the agent).

use crate::config::{ConfigError, SimConfig};
use crate::control::ControlChannel;
use crate::sim::{GameEvent, GameState, Scheduler, StateSnapshot, TickReport};

pub struct Session {
    config: SimConfig,
    state: GameState,
    scheduler: Scheduler,
    control: ControlChannel,
}

impl Session {
    /// Start a session under local control
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_control(config, ControlChannel::new())
    }

    pub fn with_control(config: SimConfig, control: ControlChannel) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(&config);
        let scheduler = Scheduler::from_config(&config);
        log::info!(
            "Session started: seed {}, {} blocks, {} lives",
            state.seed,
            state.blocks.len(),
            state.lives
        );
        Ok(Self {
            config,
            state,
            scheduler,
            control,
        })
    }

    /// Feed one frame's elapsed wall-clock time and run the ticks it covers
    pub fn frame(&mut self, elapsed_ms: f64) -> Vec<TickReport> {
        let reports = self
            .scheduler
            .advance(elapsed_ms, &mut self.state, &self.config, &mut self.control);

        for event in reports.iter().flat_map(|r| r.events.iter()) {
            if let GameEvent::LifeLost { lives_left } = event {
                log::debug!("Life lost, {} left", lives_left);
            }
        }

        reports
    }

    /// Start the episode over from its seed
    pub fn reset(&mut self) {
        self.state.reset(&self.config);
        self.scheduler.clear();
        log::info!("Session reset (seed {})", self.state.seed);
    }

    /// Start a new episode from a different seed
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.state = GameState::with_seed(&self.config, seed);
        self.scheduler.clear();
        log::info!("Session reset (seed {})", seed);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn control(&mut self) -> &mut ControlChannel {
        &mut self.control
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
