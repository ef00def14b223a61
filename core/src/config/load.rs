use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::env_file::parse_env_file;
use super::types::AppConfig;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "cmdrelay.toml";
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit TOML file; must exist when set.
    pub config_path: Option<PathBuf>,
    /// Explicit dotenv file; must exist when set.
    pub env_file: Option<PathBuf>,
}

/// Loads the configuration once at startup.
///
/// Priority (highest first): process environment, dotenv file, TOML file,
/// built-in defaults.
pub fn load(opts: &LoadOptions) -> Result<AppConfig, ConfigError> {
    let mut cfg = match opts.config_path.as_deref() {
        Some(path) => read_toml(path)?,
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.exists() {
                read_toml(local)?
            } else {
                AppConfig::default()
            }
        }
    };

    let file_vars: HashMap<String, String> = match opts.env_file.as_deref() {
        Some(path) => parse_env_file(path)?.into_iter().collect(),
        None => {
            let local = Path::new(DEFAULT_ENV_FILE);
            if local.exists() {
                parse_env_file(local)?.into_iter().collect()
            } else {
                HashMap::new()
            }
        }
    };

    apply_env_overrides(&mut cfg, |key| {
        std::env::var(key)
            .ok()
            .or_else(|| file_vars.get(key).cloned())
    })?;

    Ok(cfg)
}

fn read_toml(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Applies the environment variable overrides using `lookup` as the source.
/// Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("CLI_COMMAND") {
        cfg.command.line = Some(v);
    }
    if let Some(v) = get("CLI_WORKING_DIR") {
        cfg.command.working_dir = Some(v);
    }
    if let Some(v) = get("CLI_SHELL") {
        cfg.command.shell = parse_bool("CLI_SHELL", &v)?;
    }
    if let Some(v) = get("API_KEY") {
        cfg.http_server.api_key = Some(v);
    }
    if let Some(v) = get("ALLOWED_ORIGINS") {
        cfg.http_server.allowed_origins = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = get("HOST") {
        cfg.http_server.host = v;
    }
    if let Some(v) = get("PORT") {
        cfg.http_server.port = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".to_string(),
            value: v.clone(),
        })?;
    }
    if let Some(v) = get("LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = get("LOG_DIR") {
        cfg.logging.directory = Some(v);
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
