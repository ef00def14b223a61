mod env_file;
mod load;
mod types;

pub use env_file::parse_env_file;
pub use load::{apply_env_overrides, load, LoadOptions, DEFAULT_CONFIG_FILE, DEFAULT_ENV_FILE};
pub use types::{AppConfig, CommandConfig, HttpServerConfig, LoggingConfig, RateLimitConfig};
