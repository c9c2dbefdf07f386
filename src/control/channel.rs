//! Control channel state machine
//!
//! ```text
//! Disabled --attach--> Connecting --Connected--> Active
//!     ^                    |                        |
//!     +------ close / error / disconnect -----------+
//! ```
//!
//! `Disabled` means local keyboard control. Any link failure drops back to
//! it silently; the frame loop never sees an error.

use super::local::LocalInput;
use super::protocol::{decode_action, encode_state};
use super::remote::{LinkError, LinkEvent, RemoteLink};
use crate::sim::{Action, ActionSource, TickReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disabled,
    Connecting,
    Active,
}

#[derive(Debug, Default)]
pub struct ControlChannel {
    local: LocalInput,
    link: Option<RemoteLink>,
    active: bool,
    /// Latest action received from the agent; held until overwritten
    pending: Action,
}

impl ControlChannel {
    /// Local control, no remote link
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        match &self.link {
            None => LinkState::Disabled,
            Some(_) if self.active => LinkState::Active,
            Some(_) => LinkState::Connecting,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.link.is_some()
    }

    pub fn local_input(&mut self) -> &mut LocalInput {
        &mut self.local
    }

    /// Hand control to an agent link. Replaces any existing link.
    pub fn attach(&mut self, link: RemoteLink) {
        log::info!("Agent link connecting");
        self.link = Some(link);
        self.active = false;
        self.pending = Action::IDLE;
        self.local.release_all();
    }

    /// Start a TCP link to an agent (requires a tokio runtime)
    pub fn connect_tcp(&mut self, addr: impl Into<String>) {
        self.attach(RemoteLink::connect_tcp(addr));
    }

    /// Explicit toggle back to local control
    pub fn disconnect(&mut self) {
        if self.link.take().is_some() {
            log::info!("Agent link disabled, local control");
        }
        self.active = false;
        self.pending = Action::IDLE;
    }

    /// Drain link events that arrived since the last call
    pub fn poll(&mut self) {
        while let Some(event) = self.link.as_mut().and_then(RemoteLink::try_recv) {
            match event {
                LinkEvent::Connected => {
                    log::info!("Agent link active");
                    self.active = true;
                }
                LinkEvent::Line(line) => match decode_action(&line) {
                    Ok(action) => self.pending = action,
                    Err(e) => log::warn!("Discarding agent message: {}", e),
                },
                LinkEvent::Closed(reason) => {
                    log::warn!("Agent link closed ({}), reverting to local control", reason);
                    self.disconnect();
                }
            }
        }
    }
}

impl ActionSource for ControlChannel {
    fn next_action(&mut self) -> Action {
        self.poll();
        if self.link.is_some() {
            self.pending
        } else {
            self.local.take_action()
        }
    }

    fn observe(&mut self, report: &TickReport) {
        if self.state() != LinkState::Active {
            return;
        }
        let sent = match encode_state(report) {
            Ok(line) => self.link.as_ref().map(|link| link.send(line)),
            Err(e) => {
                log::warn!("Failed to encode state for agent: {}", e);
                return;
            }
        };
        match sent {
            Some(Err(LinkError::Backlogged)) => {
                log::debug!("Agent backlogged, dropped state for tick {}", report.tick);
            }
            Some(Err(e)) => {
                log::warn!("Agent link send failed ({}), reverting to local control", e);
                self.disconnect();
            }
            _ => {}
        }
    }
}
