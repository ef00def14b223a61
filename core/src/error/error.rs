use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("server error: {0}")]
    Server(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("env file {path} line {line}: {reason}")]
    EnvFile {
        path: String,
        line: usize,
        reason: String,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Errors the trigger entry point reports synchronously.
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("{0}")]
    Configuration(String),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
}
