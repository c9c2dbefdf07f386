//! Remote agent link
//!
//! The socket lives on a tokio task. The frame loop only ever touches the
//! channels: outbound states go through a bounded queue with `try_send`, so
//! a slow agent loses states instead of stalling ticks or piling up memory,
//! and inbound lines are drained with `try_recv` between frames.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::mpsc::{
    self, Receiver, Sender, UnboundedReceiver, UnboundedSender,
    error::{TryRecvError, TrySendError},
};

/// Longest inbound line accepted from an agent (bytes, newline excluded)
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Lines queued for the agent before new ones are refused
pub const OUTBOUND_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("link i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("agent is not keeping up, outbound queue full")]
    Backlogged,
    #[error("link task has shut down")]
    Closed,
}

/// Connection lifecycle as seen from the frame loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Line(String),
    Closed(String),
}

/// Engine-side handle to a running link task
#[derive(Debug)]
pub struct RemoteLink {
    outbound: Sender<String>,
    inbound: UnboundedReceiver<LinkEvent>,
}

impl RemoteLink {
    /// Start connecting to an agent at `addr` (`host:port`).
    ///
    /// Must be called from within a tokio runtime. Failure to connect is
    /// reported as a `LinkEvent::Closed`, not as an error here.
    pub fn connect_tcp(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (events_tx, inbound) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let connected = TcpStream::connect(&addr).await;
            let reason = match connected {
                Ok(stream) => {
                    log::info!("Agent link connected to {}", addr);
                    let _ = events_tx.send(LinkEvent::Connected);
                    match pump(stream, outbound_rx, &events_tx).await {
                        Ok(()) => "closed by peer".to_string(),
                        Err(e) => e.to_string(),
                    }
                }
                Err(source) => LinkError::Connect { addr, source }.to_string(),
            };
            let _ = events_tx.send(LinkEvent::Closed(reason));
        });

        Self { outbound, inbound }
    }

    /// In-memory link with the agent side handed back to the caller
    pub fn pair() -> (Self, AgentEnd) {
        let (outbound, from_engine) = mpsc::channel(OUTBOUND_CAPACITY);
        let (to_engine, inbound) = mpsc::unbounded_channel();
        (
            Self { outbound, inbound },
            AgentEnd {
                to_engine,
                from_engine,
            },
        )
    }

    /// Queue one line for the agent without waiting.
    ///
    /// A full queue returns `Backlogged` and the line is dropped.
    pub fn send(&self, line: String) -> Result<(), LinkError> {
        self.outbound.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => LinkError::Backlogged,
            TrySendError::Closed(_) => LinkError::Closed,
        })
    }

    /// Next pending event, if any. A vanished link task reads as `Closed`.
    pub fn try_recv(&mut self) -> Option<LinkEvent> {
        match self.inbound.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(LinkEvent::Closed(LinkError::Closed.to_string())),
        }
    }
}

/// Newline-delimited reader over raw bytes.
///
/// Invalid UTF-8 is replaced rather than rejected, so a bad line reaches the
/// protocol decoder as an ordinary malformed message. Lines longer than
/// `MAX_LINE_BYTES` are skipped up to their newline.
struct LineReader {
    reader: BufReader<OwnedReadHalf>,
    buf: Vec<u8>,
    discarding: bool,
}

impl LineReader {
    fn new(read: OwnedReadHalf) -> Self {
        Self {
            reader: BufReader::new(read),
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Next complete line, `None` at end of stream.
    ///
    /// Cancel safe: partially read bytes stay in `buf` for the next call.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let budget = (MAX_LINE_BYTES + 1).saturating_sub(self.buf.len()) as u64;
            let n = (&mut self.reader).take(budget).read_until(b'\n', &mut self.buf).await?;

            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                self.buf.clear();
                if std::mem::take(&mut self.discarding) {
                    continue;
                }
                return Ok(Some(line));
            }

            if n == 0 {
                return Ok(None);
            }

            if self.buf.len() > MAX_LINE_BYTES {
                if !self.discarding {
                    log::warn!("Skipping agent line longer than {} bytes", MAX_LINE_BYTES);
                }
                self.discarding = true;
                self.buf.clear();
            }
        }
    }
}

/// Shuttle lines both ways until either side goes away
async fn pump(
    stream: TcpStream,
    mut outbound: Receiver<String>,
    events: &UnboundedSender<LinkEvent>,
) -> Result<(), LinkError> {
    let (read, mut write) = stream.into_split();
    let mut lines = LineReader::new(read);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if events.send(LinkEvent::Line(line)).is_err() {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },
            msg = outbound.recv() => match msg {
                Some(mut msg) => {
                    msg.push('\n');
                    write.write_all(msg.as_bytes()).await?;
                }
                // Engine dropped its handle
                None => return Ok(()),
            },
        }
    }
}

/// Agent side of an in-memory link
#[derive(Debug)]
pub struct AgentEnd {
    to_engine: UnboundedSender<LinkEvent>,
    from_engine: Receiver<String>,
}

impl AgentEnd {
    pub fn connect(&self) {
        let _ = self.to_engine.send(LinkEvent::Connected);
    }

    pub fn send_line(&self, line: impl Into<String>) {
        let _ = self.to_engine.send(LinkEvent::Line(line.into()));
    }

    pub fn close(&self, reason: impl Into<String>) {
        let _ = self.to_engine.send(LinkEvent::Closed(reason.into()));
    }

    /// Next line the engine sent, if any
    pub fn try_recv_line(&mut self) -> Option<String> {
        self.from_engine.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    async fn next_event(link: &mut RemoteLink) -> LinkEvent {
        for _ in 0..200 {
            if let Some(event) = link.try_recv() {
                return event;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no link event within 1s");
    }

    #[tokio::test]
    async fn test_tcp_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut link = RemoteLink::connect_tcp(addr);
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut agent_lines = BufReader::new(read).lines();

        assert_eq!(next_event(&mut link).await, LinkEvent::Connected);

        link.send("hello".to_string()).unwrap();
        assert_eq!(agent_lines.next_line().await.unwrap().as_deref(), Some("hello"));

        write.write_all(b"reply\n").await.unwrap();
        assert_eq!(next_event(&mut link).await, LinkEvent::Line("reply".to_string()));

        drop(write);
        drop(agent_lines);
        assert!(matches!(next_event(&mut link).await, LinkEvent::Closed(_)));
    }

    #[tokio::test]
    async fn test_connect_failure_reports_closed() {
        // Grab a free port, then release it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut link = RemoteLink::connect_tcp(addr);
        assert!(matches!(next_event(&mut link).await, LinkEvent::Closed(_)));
    }

    #[tokio::test]
    async fn test_malformed_bytes_keep_link_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut link = RemoteLink::connect_tcp(addr);
        let (mut socket, _) = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut link).await, LinkEvent::Connected);

        socket.write_all(b"first\n").await.unwrap();
        socket.write_all(b"{\"type\":\"action\",\"data\":{\"move\":\xff}}\r\n").await.unwrap();
        socket.write_all(b"last\n").await.unwrap();

        assert_eq!(next_event(&mut link).await, LinkEvent::Line("first".to_string()));
        match next_event(&mut link).await {
            LinkEvent::Line(line) => assert!(line.contains('\u{FFFD}')),
            other => panic!("expected a line, got {other:?}"),
        }
        assert_eq!(next_event(&mut link).await, LinkEvent::Line("last".to_string()));
        assert_eq!(link.try_recv(), None);
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut link = RemoteLink::connect_tcp(addr);
        let (mut socket, _) = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut link).await, LinkEvent::Connected);

        let mut huge = vec![b'a'; MAX_LINE_BYTES * 2 + 10];
        huge.push(b'\n');
        socket.write_all(&huge).await.unwrap();
        socket.write_all(b"ok\n").await.unwrap();

        assert_eq!(next_event(&mut link).await, LinkEvent::Line("ok".to_string()));
    }

    #[tokio::test]
    async fn test_stalled_agent_does_not_grow_queue() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut link = RemoteLink::connect_tcp(addr);
        // Accepted and held open, never read
        let (_socket, _) = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut link).await, LinkEvent::Connected);

        let state = "x".repeat(64 * 1024);
        let mut refused = 0;
        for _ in 0..1_000 {
            match link.send(state.clone()) {
                Ok(()) => {}
                Err(LinkError::Backlogged) => refused += 1,
                Err(e) => panic!("link failed: {e}"),
            }
            tokio::task::yield_now().await;
        }
        assert!(refused > 0, "queue never filled");
        assert_eq!(link.try_recv(), None);
    }

    #[test]
    fn test_full_queue_refuses_then_recovers() {
        let (link, mut agent) = RemoteLink::pair();
        for i in 0..OUTBOUND_CAPACITY {
            link.send(i.to_string()).unwrap();
        }
        assert!(matches!(link.send("extra".to_string()), Err(LinkError::Backlogged)));

        assert_eq!(agent.try_recv_line().as_deref(), Some("0"));
        link.send("again".to_string()).unwrap();
    }

    #[test]
    fn test_pair_delivers_both_ways() {
        let (mut link, mut agent) = RemoteLink::pair();
        agent.connect();
        agent.send_line("x");
        assert_eq!(link.try_recv(), Some(LinkEvent::Connected));
        assert_eq!(link.try_recv(), Some(LinkEvent::Line("x".to_string())));
        assert_eq!(link.try_recv(), None);

        link.send("y".to_string()).unwrap();
        assert_eq!(agent.try_recv_line().as_deref(), Some("y"));

        drop(agent);
        assert!(matches!(link.try_recv(), Some(LinkEvent::Closed(_))));
    }
}
