use std::path::PathBuf;

use clap::Parser;
use cmdrelay_core::api::{AppConfig, LoadOptions};

/// Run a configured command on `POST /api/trigger` and stream its output as server-sent events.
#[derive(Parser, Debug)]
#[command(name = "cmdrelay", version, about)]
pub struct Args {
    /// TOML config file (defaults to ./cmdrelay.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dotenv file (defaults to ./.env when present).
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

impl Args {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            env_file: self.env_file.clone(),
        }
    }

    /// Command-line flags win over every other source.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(host) = self.host.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            cfg.http_server.host = host.to_string();
        }
        if let Some(port) = self.port {
            cfg.http_server.port = port;
        }
    }
}
