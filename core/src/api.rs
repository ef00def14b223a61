//! Stable re-exports for the `cli` crate and external consumers.
//!
//! Prefer importing from `cmdrelay_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load, AppConfig, CommandConfig, HttpServerConfig, LoadOptions, LoggingConfig,
    RateLimitConfig,
};
pub use crate::error::{CliError, ConfigError, RunnerError, TriggerError};
pub use crate::runner::{
    CommandSpec, ProcessEvent, ProcessLauncher, RunOutcome, RunSummary, SubprocessHandle,
    TokioLauncher,
};
pub use crate::stream::{EventSource, SessionState, SseBody, SseWriter, StreamEvent, SSE_HEADERS};
pub use crate::trigger::{TriggerHandler, TriggerSession};
