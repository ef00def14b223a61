use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub command: CommandConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The command a trigger runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Whitespace-separated command line; the first token is the program.
    #[serde(default)]
    pub line: Option<String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    /// Run the line through the platform shell instead of exec'ing it directly.
    #[serde(default)]
    pub shell: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Secret expected in the `x-api-key` header. When unset every trigger is rejected.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Bounds the time to produce response headers, not the event stream body.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            allowed_origins: default_allowed_origins(),
            rate_limit: RateLimitConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_max_requests() -> u32 {
    100
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, write `combined.log` and `error.log` under `directory`.
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "cmdrelay_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Directory for log files. Defaults to `./logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}
