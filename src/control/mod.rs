//! Paddle control sources
//!
//! Either local keys or a remote agent drive the paddle. Both end up as an
//! `Action` handed to the scheduler through `ControlChannel`.

pub mod channel;
pub mod local;
pub mod protocol;
pub mod remote;

pub use channel::{ControlChannel, LinkState};
pub use local::{Binding, Key, KeyMap, LocalInput};
pub use protocol::{Message, ProtocolError, decode_action, encode_action, encode_state};
pub use remote::{AgentEnd, LinkError, LinkEvent, MAX_LINE_BYTES, OUTBOUND_CAPACITY, RemoteLink};
