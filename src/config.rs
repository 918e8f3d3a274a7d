use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scraper: ScraperConfig,
    pub checker: CheckerConfig,
    pub sessions: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Desktop-browser identity sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Cycle cadence, measured from checker start.
    pub interval_minutes: u64,
    /// Pause between consecutive outbound fetches within a cycle.
    pub request_delay_ms: u64,
    /// Relative change (percent, inclusive) that triggers a notification.
    pub change_threshold_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long an abandoned add-product conversation stays answerable.
    pub ttl_minutes: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "PRICEWATCH_"
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max_connections must be greater than 0".into(),
            ));
        }

        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message(
                "Scraper user_agent must not be empty".into(),
            ));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.checker.interval_minutes == 0 {
            return Err(ConfigError::Message(
                "Checker interval_minutes must be greater than 0".into(),
            ));
        }

        if self.checker.change_threshold_percent <= 0.0 {
            return Err(ConfigError::Message(
                "Checker change_threshold_percent must be greater than 0".into(),
            ));
        }

        if self.sessions.ttl_minutes == 0 {
            return Err(ConfigError::Message(
                "Session ttl_minutes must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
