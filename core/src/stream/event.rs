use std::fmt;

use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Stdout,
    Stderr,
    /// Completion and error notices produced by the relay itself.
    System,
}

impl EventSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Stdout => "STDOUT",
            EventSource::Stderr => "STDERR",
            EventSource::System => "SYSTEM",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of output delivered to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub source: EventSource,
    pub text: String,
}

impl StreamEvent {
    pub fn new(source: EventSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }

    /// Builds an output event from a raw pipe chunk.
    ///
    /// Returns `None` when the chunk is empty after trimming trailing whitespace.
    pub fn from_chunk(source: EventSource, chunk: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(chunk);
        let text = text.trim_end();
        if text.is_empty() {
            return None;
        }
        Some(Self::new(source, text))
    }

    pub fn completed(code: i32) -> Self {
        Self::new(
            EventSource::System,
            format!("Command completed with code {code}"),
        )
    }

    pub fn error(message: &str) -> Self {
        Self::new(EventSource::System, format!("Error: {message}"))
    }

    /// Server-Sent Events framing: one `data:` line per text line, then a
    /// blank line. `\r\n`, bare `\r` and `\n` all end a line, as they do for
    /// an event-stream parser.
    pub fn to_sse_frame(&self) -> Bytes {
        let mut out = String::with_capacity(self.text.len() + 8);
        let normalized = self.text.replace("\r\n", "\n");
        for line in normalized.split(['\r', '\n']) {
            out.push_str("data: ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        Bytes::from(out)
    }
}
