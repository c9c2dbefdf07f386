//! Agent wire protocol
//!
//! One JSON object per line, tagged by `type` with the body under `data`:
//!
//! ```text
//! -> {"type":"state","data":{"paddle":{..},"ball":{..},"blocks":[..],"score":0,...}}
//! <- {"type":"action","data":{"move":1}}
//! ```
//!
//! Move codes: -1 left, 0 stop, 1 right, 2 jump, 3 launch.

use serde::{Deserialize, Serialize};

use crate::sim::{Action, GameEvent, StateSnapshot, TickReport};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected {0} message from agent")]
    UnexpectedType(&'static str),
    #[error("unknown move code {0}")]
    UnknownMove(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Message {
    State(StatePayload),
    Action(ActionPayload),
}

/// A tick's resulting state plus the per-tick extras an agent trains on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    #[serde(flatten)]
    pub state: StateSnapshot,
    pub tick: u64,
    pub reward: f32,
    pub events: Vec<GameEvent>,
}

impl From<&TickReport> for StatePayload {
    fn from(report: &TickReport) -> Self {
        Self {
            state: report.state.clone(),
            tick: report.tick,
            reward: report.reward,
            events: report.events.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(rename = "move")]
    pub code: i64,
}

/// Serialize a tick report as one outbound line (no trailing newline)
pub fn encode_state(report: &TickReport) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&Message::State(StatePayload::from(report)))?)
}

/// Build the line an agent sends for a move code
pub fn encode_action(code: i64) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&Message::Action(ActionPayload { code }))?)
}

/// Parse one inbound line into the action it requests
pub fn decode_action(line: &str) -> Result<Action, ProtocolError> {
    match serde_json::from_str::<Message>(line.trim())? {
        Message::Action(ActionPayload { code }) => {
            Action::from_code(code).ok_or(ProtocolError::UnknownMove(code))
        }
        Message::State(_) => Err(ProtocolError::UnexpectedType("state")),
    }
}
