//! Stream events and the server-sent event writer that delivers them.

mod event;
mod writer;

pub use event::{EventSource, StreamEvent};
pub use writer::{session, SessionState, SseBody, SseWriter, SSE_HEADERS};
