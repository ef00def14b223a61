use std::path::PathBuf;

use crate::config::CommandConfig;
use crate::error::TriggerError;

pub const NOT_CONFIGURED: &str = "CLI command not configured";

/// Program, arguments and working directory of one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Splits `line` on whitespace; the first token is the program.
    pub fn parse(line: &str, working_dir: Option<&str>) -> Result<Self, TriggerError> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let program = tokens
            .next()
            .ok_or_else(|| TriggerError::Configuration(NOT_CONFIGURED.to_string()))?;
        Ok(Self {
            program,
            args: tokens.collect(),
            working_dir: normalize_dir(working_dir),
        })
    }

    /// Wraps the whole line in the platform shell.
    pub fn shell(line: &str, working_dir: Option<&str>) -> Result<Self, TriggerError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(TriggerError::Configuration(NOT_CONFIGURED.to_string()));
        }
        let (program, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        Ok(Self {
            program: program.to_string(),
            args: vec![flag.to_string(), line.to_string()],
            working_dir: normalize_dir(working_dir),
        })
    }

    pub fn from_config(cfg: &CommandConfig) -> Result<Self, TriggerError> {
        let line = cfg
            .line
            .as_deref()
            .ok_or_else(|| TriggerError::Configuration(NOT_CONFIGURED.to_string()))?;
        let dir = cfg.working_dir.as_deref();
        if cfg.shell {
            Self::shell(line, dir)
        } else {
            Self::parse(line, dir)
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }
}

fn normalize_dir(dir: Option<&str>) -> Option<PathBuf> {
    dir.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
