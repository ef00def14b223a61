use std::process::Stdio;

use bytes::Bytes;
use tokio::process::Command;
use tokio::sync::mpsc;

use super::command::CommandSpec;
use super::io_pump;
use crate::error::RunnerError;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Everything a running subprocess reports, in the order it was observed.
///
/// A handle yields any number of output chunks followed by exactly one of
/// `Exited` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Stdout(Bytes),
    Stderr(Bytes),
    /// Exit status once both pipes are closed; `-1` if killed by a signal.
    Exited(i32),
    Failed(String),
}

impl ProcessEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessEvent::Exited(_) | ProcessEvent::Failed(_))
    }
}

/// Receiving end of one subprocess run. Not reusable.
#[derive(Debug)]
pub struct SubprocessHandle {
    events: mpsc::Receiver<ProcessEvent>,
}

impl SubprocessHandle {
    /// Creates a handle together with the sender that feeds it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<ProcessEvent>, Self) {
        let (tx, events) = mpsc::channel(capacity);
        (tx, Self { events })
    }

    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.events.recv().await
    }
}

pub trait ProcessLauncher: Send + Sync {
    fn name(&self) -> &str;

    /// Starts `spec` and returns immediately. Spawn failures arrive later as
    /// `ProcessEvent::Failed` on the returned handle.
    fn launch(&self, spec: &CommandSpec) -> SubprocessHandle;
}

pub struct TokioLauncher {
    channel_capacity: usize,
}

impl TokioLauncher {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(capacity: usize) -> Self {
        Self {
            channel_capacity: capacity.max(1),
        }
    }
}

impl Default for TokioLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for TokioLauncher {
    fn name(&self) -> &str {
        "tokio"
    }

    fn launch(&self, spec: &CommandSpec) -> SubprocessHandle {
        let (tx, handle) = SubprocessHandle::channel(self.channel_capacity);
        let spec = spec.clone();
        tokio::spawn(async move {
            let terminal = match run_child(&spec, tx.clone()).await {
                Ok(code) => ProcessEvent::Exited(code),
                Err(e) => {
                    tracing::error!(program = %spec.program(), error = %e, "subprocess failed");
                    ProcessEvent::Failed(e.to_string())
                }
            };
            let _ = tx.send(terminal).await;
        });
        handle
    }
}

async fn run_child(spec: &CommandSpec, tx: mpsc::Sender<ProcessEvent>) -> Result<i32, RunnerError> {
    let mut cmd = Command::new(spec.program());
    cmd.args(spec.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = spec.working_dir() {
        if !dir.is_dir() {
            return Err(RunnerError::Spawn(format!(
                "working directory not found: {}",
                dir.display()
            )));
        }
        cmd.current_dir(dir);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| RunnerError::Spawn(format!("{}: {e}", spec.program())))?;
    tracing::debug!(pid = ?child.id(), program = %spec.program(), "subprocess spawned");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Spawn("no stdout".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Spawn("no stderr".into()))?;

    let out_task = io_pump::pump_stdout(stdout, tx.clone());
    let err_task = io_pump::pump_stderr(stderr, tx);

    // Exit is reported only after both pipes hit EOF so no chunk trails it.
    for task in [out_task, err_task] {
        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "output pump stopped early"),
            Err(e) => tracing::warn!(error = %e, "output pump task failed"),
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| RunnerError::Spawn(format!("wait failed: {e}")))?;
    Ok(status.code().unwrap_or(-1))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    async fn collect(mut handle: SubprocessHandle) -> Vec<ProcessEvent> {
        let mut out = Vec::new();
        while let Some(ev) = handle.next_event().await {
            out.push(ev);
        }
        out
    }

    fn stdout_text(events: &[ProcessEvent]) -> String {
        events
            .iter()
            .filter_map(|ev| match ev {
                ProcessEvent::Stdout(b) => Some(String::from_utf8_lossy(b).into_owned()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn echo_reports_output_then_exit_zero() {
        let spec = CommandSpec::parse("echo hello", None).unwrap();
        let events = collect(TokioLauncher::new().launch(&spec)).await;

        assert_eq!(stdout_text(&events), "hello\n");
        assert_eq!(events.last(), Some(&ProcessEvent::Exited(0)));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn non_zero_exit_code_is_preserved() {
        let spec = CommandSpec::shell("echo oops >&2; exit 3", None).unwrap();
        let events = collect(TokioLauncher::new().launch(&spec)).await;

        let stderr: String = events
            .iter()
            .filter_map(|ev| match ev {
                ProcessEvent::Stderr(b) => Some(String::from_utf8_lossy(b).into_owned()),
                _ => None,
            })
            .collect();
        assert_eq!(stderr, "oops\n");
        assert_eq!(events.last(), Some(&ProcessEvent::Exited(3)));
    }

    #[tokio::test]
    async fn missing_binary_fails_without_exit() {
        let spec = CommandSpec::parse("cmdrelay-definitely-not-a-binary --x", None).unwrap();
        let events = collect(TokioLauncher::new().launch(&spec)).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            ProcessEvent::Failed(msg) => {
                assert!(msg.contains("cmdrelay-definitely-not-a-binary"), "{msg}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_working_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        let spec = CommandSpec::parse("pwd", gone.to_str()).unwrap();
        let events = collect(TokioLauncher::new().launch(&spec)).await;

        assert!(matches!(
            events.as_slice(),
            [ProcessEvent::Failed(msg)] if msg.contains("working directory not found")
        ));
    }

    #[tokio::test]
    async fn runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let spec = CommandSpec::parse("ls", dir.path().to_str()).unwrap();
        let events = collect(TokioLauncher::new().launch(&spec)).await;

        assert!(stdout_text(&events).contains("marker.txt"));
        assert_eq!(events.last(), Some(&ProcessEvent::Exited(0)));
    }

    #[tokio::test]
    async fn tiny_channel_still_delivers_everything() {
        let spec = CommandSpec::parse("seq 1 2000", None).unwrap();
        let events = collect(TokioLauncher::with_channel_capacity(1).launch(&spec)).await;

        let expected: String = (1..=2000).map(|i| format!("{i}\n")).collect();
        assert_eq!(stdout_text(&events), expected);
        assert_eq!(events.last(), Some(&ProcessEvent::Exited(0)));
    }
}
