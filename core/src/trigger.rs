//! Entry point that turns one trigger request into one streamed subprocess run.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::CommandConfig;
use crate::error::TriggerError;
use crate::runner::{multiplex, CommandSpec, ProcessLauncher, RunOutcome, RunSummary};
use crate::stream::{session, SseBody};

/// A started run: the body to stream back plus the task driving it.
#[derive(Debug)]
pub struct TriggerSession {
    pub run_id: String,
    pub body: SseBody,
    pub task: JoinHandle<RunSummary>,
}

pub struct TriggerHandler {
    command: CommandConfig,
    launcher: Arc<dyn ProcessLauncher>,
}

impl TriggerHandler {
    pub fn new(command: CommandConfig, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self { command, launcher }
    }

    /// Launches the configured command and returns without waiting for it.
    ///
    /// Only a missing command fails here; everything the subprocess does
    /// afterwards, including failing to start, is reported through the body.
    pub fn trigger(&self) -> Result<TriggerSession, TriggerError> {
        let spec = CommandSpec::from_config(&self.command)?;
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("run", run_id = %run_id);

        span.in_scope(|| {
            tracing::info!(
                program = %spec.program(),
                args = ?spec.args(),
                cwd = ?spec.working_dir(),
                launcher = self.launcher.name(),
                "launching command"
            );
        });

        let handle = self.launcher.launch(&spec);
        let (mut writer, body) = session();
        writer.open();

        let task = tokio::spawn(
            async move {
                let summary = multiplex(handle, &mut writer).await;
                match &summary.outcome {
                    RunOutcome::Exited(code) => tracing::info!(
                        exit_code = code,
                        stdout_events = summary.stdout_events,
                        stderr_events = summary.stderr_events,
                        "run finished"
                    ),
                    RunOutcome::Failed(msg) => tracing::warn!(error = %msg, "run failed"),
                }
                summary
            }
            .instrument(span),
        );

        Ok(TriggerSession { run_id, body, task })
    }
}
