mod command;
mod io_pump;
mod launcher;
mod multiplex;

pub use command::{CommandSpec, NOT_CONFIGURED};
pub use launcher::{ProcessEvent, ProcessLauncher, SubprocessHandle, TokioLauncher};
pub use multiplex::{multiplex, RunOutcome, RunSummary};
