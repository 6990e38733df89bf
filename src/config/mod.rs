mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tokio::sync::Semaphore;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(&config_path).await
}

/// Reads the YAML file at `path`, applies environment overrides and validates
/// the result. A missing file falls back to defaults so the bot can run from
/// environment variables alone.
pub async fn load_from(path: &str) -> Result<Config> {
    load_from_with(path, |key| env::var(key).ok()).await
}

/// Same as [`load_from`], with overrides read through `lookup` instead of the
/// process environment.
pub async fn load_from_with<F>(path: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    debug!("Loading configuration from: {}", path);

    let mut config: Config = match tokio::fs::read_to_string(path).await {
        Ok(config_str) => serde_yaml::from_str(&config_str)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No configuration file at {}, using defaults", path);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    config.apply_overrides(lookup);
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Environment wins over the file for the values operators usually keep
    /// out of version control.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").filter(|t| !t.is_empty()) {
            self.gateway.telegram.token = Some(token);
        }
        if let Some(endpoint) = lookup("INFERENCE_ENDPOINT").filter(|e| !e.is_empty()) {
            self.inference.endpoint = endpoint;
        }
        if let Some(model) = lookup("INFERENCE_MODEL").filter(|m| !m.is_empty()) {
            self.inference.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.inference.endpoint.trim().is_empty() {
            return Err(Error::config("inference.endpoint must not be empty"));
        }
        if self.inference.model.trim().is_empty() {
            return Err(Error::config("inference.model must not be empty"));
        }
        if self.inference.timeout_secs == 0 {
            return Err(Error::config("inference.timeout_secs must be greater than 0"));
        }
        if self.inference.max_concurrent_requests == 0 {
            return Err(Error::config(
                "inference.max_concurrent_requests must be greater than 0",
            ));
        }
        if self.inference.max_concurrent_requests > Semaphore::MAX_PERMITS {
            return Err(Error::config(format!(
                "inference.max_concurrent_requests must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.inference.max_request_chars == 0 {
            return Err(Error::config(
                "inference.max_request_chars must be greater than 0",
            ));
        }
        if self.gateway.mode == GatewayMode::Telegram
            && self.gateway.telegram.token.as_deref().is_none_or(str::is_empty)
        {
            return Err(Error::config(
                "TELEGRAM_BOT_TOKEN is required when gateway.mode is telegram",
            ));
        }
        Ok(())
    }
}
