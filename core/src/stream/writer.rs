use bytes::Bytes;
use tokio::sync::mpsc;

use super::event::StreamEvent;

/// Response headers for an event stream session.
pub const SSE_HEADERS: [(&str, &str); 3] = [
    ("content-type", "text/event-stream"),
    ("cache-control", "no-cache"),
    ("connection", "keep-alive"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Open,
    Closed,
}

/// Creates the writer half and the response-body half of one session.
pub fn session() -> (SseWriter, SseBody) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        SseWriter {
            tx: Some(tx),
            state: SessionState::Idle,
            frames: 0,
        },
        SseBody { rx },
    )
}

/// Writes framed events into one response session and closes it exactly once.
///
/// Nothing here returns an error: a vanished client only moves the session to
/// `Closed`, and every call after that is a logged no-op.
#[derive(Debug)]
pub struct SseWriter {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
    state: SessionState,
    frames: usize,
}

impl SseWriter {
    /// `Idle -> Open`. Returns false if the session was already opened or closed.
    pub fn open(&mut self) -> bool {
        if self.state != SessionState::Idle {
            tracing::warn!(state = ?self.state, "open ignored");
            return false;
        }
        self.state = SessionState::Open;
        true
    }

    pub fn write(&mut self, event: &StreamEvent) {
        match self.state {
            SessionState::Open => {
                self.send_frame(event.to_sse_frame());
            }
            SessionState::Idle => {
                tracing::warn!(source = %event.source, "write before open ignored");
            }
            SessionState::Closed => {
                tracing::debug!(source = %event.source, "write after close ignored");
            }
        }
    }

    pub fn close_on_exit(&mut self, code: i32) {
        self.finish(StreamEvent::completed(code));
    }

    pub fn close_on_error(&mut self, message: &str) {
        self.finish(StreamEvent::error(message));
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    fn finish(&mut self, last: StreamEvent) {
        match self.state {
            SessionState::Open => {
                self.send_frame(last.to_sse_frame());
                self.close();
            }
            SessionState::Idle => {
                tracing::warn!("close before open; session discarded");
                self.close();
            }
            SessionState::Closed => {
                tracing::debug!(text = %last.text, "session already closed");
            }
        }
    }

    fn send_frame(&mut self, frame: Bytes) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        if tx.send(frame).is_err() {
            tracing::warn!("client disconnected; closing event stream");
            self.close();
            return;
        }
        self.frames += 1;
    }

    fn close(&mut self) {
        self.state = SessionState::Closed;
        // Dropping the sender ends the response body.
        self.tx = None;
    }
}

/// Receiving half of a session; becomes the HTTP response body.
#[derive(Debug)]
pub struct SseBody {
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl SseBody {
    pub async fn next_frame(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Drains every frame until the writer closes the session.
    pub async fn collect(mut self) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame().await {
            frames.push(frame);
        }
        frames
    }
}
