//! Fixed timestep scheduler
//!
//! Turns variable wall-clock frame times into a whole number of fixed ticks.
//! Elapsed time accumulates, the accumulator is capped so a long stall cannot
//! queue unbounded catch-up work, and every tick integrates with the same dt.

use super::snapshot::StateSnapshot;
use super::state::{GameEvent, GameState};
use super::tick::{Action, tick};
use crate::config::SimConfig;

/// Where each tick's action comes from, and who sees each tick's result
pub trait ActionSource {
    /// Consume the pending action for the next tick
    fn next_action(&mut self) -> Action;

    /// Called after every tick with its result
    fn observe(&mut self, _report: &TickReport) {}
}

/// A fixed action repeated every tick (scripted runs, training loops)
impl ActionSource for Action {
    fn next_action(&mut self) -> Action {
        *self
    }
}

/// The outcome of one scheduled tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick number since the last reset (1-based)
    pub tick: u64,
    pub state: StateSnapshot,
    pub reward: f32,
    pub events: Vec<GameEvent>,
}

/// Accumulator-driven fixed timestep
#[derive(Debug, Clone)]
pub struct Scheduler {
    accumulator_ms: f64,
    tick_ms: f64,
    max_accumulated_ms: f64,
}

impl Scheduler {
    pub fn new(tick_ms: f64, max_accumulated_ms: f64) -> Self {
        let tick_ms = if tick_ms > 0.0 { tick_ms } else { crate::consts::TICK_MS };
        Self {
            accumulator_ms: 0.0,
            tick_ms,
            max_accumulated_ms: max_accumulated_ms.max(tick_ms),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.timing.tick_ms, config.timing.max_accumulated_ms)
    }

    /// Unconsumed time carried into the next call
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulator_ms
    }

    /// Drop any carried-over time
    pub fn clear(&mut self) {
        self.accumulator_ms = 0.0;
    }

    /// Add `elapsed_ms` of real time and run as many fixed ticks as it covers.
    ///
    /// Negative or non-finite samples count as zero. Time beyond the cap is
    /// discarded, not queued.
    pub fn advance<S: ActionSource + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        state: &mut GameState,
        config: &SimConfig,
        source: &mut S,
    ) -> Vec<TickReport> {
        let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };
        self.accumulator_ms = (self.accumulator_ms + elapsed_ms).min(self.max_accumulated_ms);

        let mut reports = Vec::with_capacity((self.accumulator_ms / self.tick_ms) as usize);
        while self.accumulator_ms >= self.tick_ms {
            let action = source.next_action();
            let outcome = tick(state, &action, config);
            self.accumulator_ms -= self.tick_ms;

            let report = TickReport {
                tick: state.time_ticks,
                state: StateSnapshot::from(&*state),
                reward: outcome.reward,
                events: outcome.events,
            };
            source.observe(&report);
            reports.push(report);
        }

        reports
    }
}
