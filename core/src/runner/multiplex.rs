use super::launcher::{ProcessEvent, SubprocessHandle};
use crate::stream::{EventSource, SseWriter, StreamEvent};

/// How a run ended from the relay's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Exited(i32),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stdout_events: usize,
    pub stderr_events: usize,
    pub outcome: RunOutcome,
}

/// Drives `writer` from the events of `handle` until the first terminal event.
///
/// Output keeps being consumed and logged after the client disconnects; the
/// writer silently drops it.
pub async fn multiplex(mut handle: SubprocessHandle, writer: &mut SseWriter) -> RunSummary {
    let mut stdout_events = 0usize;
    let mut stderr_events = 0usize;

    let outcome = loop {
        let Some(event) = handle.next_event().await else {
            let msg = "process ended without exit status";
            tracing::error!("{msg}");
            writer.close_on_error(msg);
            break RunOutcome::Failed(msg.to_string());
        };

        match event {
            ProcessEvent::Stdout(chunk) => {
                if let Some(ev) = StreamEvent::from_chunk(EventSource::Stdout, &chunk) {
                    stdout_events += 1;
                    forward(writer, &ev);
                }
            }
            ProcessEvent::Stderr(chunk) => {
                if let Some(ev) = StreamEvent::from_chunk(EventSource::Stderr, &chunk) {
                    stderr_events += 1;
                    forward(writer, &ev);
                }
            }
            ProcessEvent::Exited(code) => {
                tracing::info!("Command completed with code {code}");
                writer.close_on_exit(code);
                break RunOutcome::Exited(code);
            }
            ProcessEvent::Failed(msg) => {
                tracing::error!("Error: {msg}");
                writer.close_on_error(&msg);
                break RunOutcome::Failed(msg);
            }
        }
    };

    RunSummary {
        stdout_events,
        stderr_events,
        outcome,
    }
}

fn forward(writer: &mut SseWriter, ev: &StreamEvent) {
    tracing::info!(stream = %ev.source, "{}: {}", ev.source, ev.text);
    writer.write(ev);
}
