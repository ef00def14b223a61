//! Shared handler state

use std::sync::Arc;
use std::time::Duration;

use cmdrelay_core::api::{AppConfig, ProcessLauncher, TriggerHandler};

use super::rate_limit::RateLimiter;

/// Application state shared by every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub trigger: Arc<TriggerHandler>,
    pub config: Arc<AppConfig>,
    pub limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(config: AppConfig, launcher: Arc<dyn ProcessLauncher>) -> Self {
        let trigger = TriggerHandler::new(config.command.clone(), launcher);
        let rl = &config.http_server.rate_limit;
        let limiter = rl.enabled.then(|| {
            Arc::new(RateLimiter::new(
                Duration::from_secs(rl.window_secs),
                rl.max_requests,
            ))
        });
        Self {
            trigger: Arc::new(trigger),
            config: Arc::new(config),
            limiter,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.config
            .http_server
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdrelay_core::api::TokioLauncher;

    #[test]
    fn blank_api_key_counts_as_unset() {
        let mut cfg = AppConfig::default();
        cfg.http_server.api_key = Some(String::new());
        let state = AppState::new(cfg, Arc::new(TokioLauncher::new()));
        assert_eq!(state.api_key(), None);
    }

    #[test]
    fn rate_limiter_follows_config() {
        let mut cfg = AppConfig::default();
        assert!(AppState::new(cfg.clone(), Arc::new(TokioLauncher::new()))
            .limiter
            .is_some());
        cfg.http_server.rate_limit.enabled = false;
        assert!(AppState::new(cfg, Arc::new(TokioLauncher::new()))
            .limiter
            .is_none());
    }
}
