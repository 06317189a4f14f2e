//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::AppResult;

/// Largest page the alert service hands out per call.
pub const MAX_ALERT_PAGE_SIZE: u32 = 100;

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    /// Notification backend configuration.
    #[validate(nested)]
    pub api: ApiConfig,
    /// Alert service configuration.
    #[serde(default)]
    #[validate(nested)]
    pub alerts: AlertsConfig,
    /// Session store configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Notification backend configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL all `/user/notifications` paths are joined to.
    #[validate(url)]
    pub base_url: String,
    /// Optional request timeout. Unset means the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Alert service configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AlertsConfig {
    /// Base URL of the alert service. Falls back to `api.base_url`.
    #[serde(default)]
    #[validate(url)]
    pub base_url: Option<String>,
    /// Unresolved alerts requested per call.
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1))]
    pub page_size: u32,
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path of the persisted session file.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

const fn default_page_size() -> u32 {
    MAX_ALERT_PAGE_SIZE
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".alertboard/session.json")
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            page_size: default_page_size(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl AlertsConfig {
    /// Page size actually sent to the alert service.
    #[must_use]
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_ALERT_PAGE_SIZE)
    }
}

impl Config {
    /// Build a configuration pointing both backends at `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                timeout_secs: None,
            },
            alerts: AlertsConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Base URL of the alert service.
    #[must_use]
    pub fn alerts_base_url(&self) -> &str {
        self.alerts.base_url.as_deref().unwrap_or(&self.api.base_url)
    }

    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `ALERTBOARD_ENV`)
    /// 3. Environment variables with `ALERTBOARD__` prefix
    pub fn load() -> AppResult<Self> {
        let env = std::env::var("ALERTBOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ALERTBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("ALERTBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    fn finish(config: config::Config) -> AppResult<Self> {
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::AppError;

    fn parse(toml: &str) -> AppResult<Config> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Config::finish(config)
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse("[api]\nbase_url = \"https://vault.example.com/api\"\n").unwrap();
        assert_eq!(config.alerts.page_size, 100);
        assert_eq!(config.alerts_base_url(), "https://vault.example.com/api");
        assert_eq!(
            config.session.path,
            PathBuf::from(".alertboard/session.json")
        );
        assert!(config.api.timeout_secs.is_none());
    }

    #[test]
    fn test_alerts_base_url_override() {
        let config = parse(
            "[api]\nbase_url = \"https://vault.example.com/api\"\n\
             [alerts]\nbase_url = \"https://alerts.example.com\"\npage_size = 250\n",
        )
        .unwrap();
        assert_eq!(config.alerts_base_url(), "https://alerts.example.com");
        assert_eq!(config.alerts.effective_page_size(), MAX_ALERT_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = parse("[api]\nbase_url = \"not a url\"\n");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_missing_api_section_rejected() {
        let result = parse("[alerts]\npage_size = 10\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
