//! Configuration management for the Dominion Energy client
//!
//! Configuration is loaded from YAML with optional environment variable
//! overrides for the account credentials and log level.

use crate::error::{DominionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

pub use defaults::{DEFAULT_API_BASE, DEFAULT_LOGIN_BASE, DEFAULT_USER_AGENT};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Utility account credentials
    pub account: AccountConfig,

    /// Provider hosts
    pub endpoints: EndpointsConfig,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// IANA timezone used to decide what "today" is for daily cost
    pub timezone: String,

    /// Expected polling cadence in seconds; informational for callers
    pub poll_interval_seconds: u64,
}

/// Account credentials as entered by the user
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Login e-mail / username
    pub username: String,

    /// Login password
    pub password: String,

    /// Utility account number sent with every data request
    pub account_number: String,

    /// Pre-obtained long-lived bearer token; skips the login sequence
    pub token: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("account_number", &self.account_number)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Provider base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Host serving the login page, token and authn endpoints
    pub login_base: String,

    /// Base of the data API (bill forecast, usage and bill history)
    pub api_base: String,
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// Origin header expected by the data API
    pub origin: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Directory or file path for the rolling log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to write to a log file at all
    pub file_output: bool,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Immutable credentials handed to the client
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub account_number: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            account_number: account_number.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("account_number", &self.account_number)
            .finish()
    }
}

const DEFAULT_PATHS: [&str; 3] = [
    "dominion_energy.yaml",
    "/data/dominion_energy.yaml",
    "/etc/dominion_energy/config.yaml",
];

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from the first existing default location, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match DEFAULT_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply `DOMINION_*` overrides from the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = non_empty("DOMINION_USERNAME") {
            self.account.username = v;
        }
        if let Some(v) = non_empty("DOMINION_PASSWORD") {
            self.account.password = v;
        }
        if let Some(v) = non_empty("DOMINION_ACCOUNT_NUMBER") {
            self.account.account_number = v;
        }
        if let Some(v) = non_empty("DOMINION_TOKEN") {
            self.account.token = Some(v);
        }
        if let Some(v) = non_empty("DOMINION_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Credentials record for the client
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.account.username.clone(),
            self.account.password.clone(),
            self.account.account_number.clone(),
        )
    }

    /// Parsed configured timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|_| {
            DominionError::validation("timezone", "Unknown IANA timezone")
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.account.account_number.trim().is_empty() {
            return Err(DominionError::validation(
                "account.account_number",
                "Account number cannot be empty",
            ));
        }

        let has_token = self
            .account
            .token
            .as_ref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_token {
            if self.account.username.trim().is_empty() {
                return Err(DominionError::validation(
                    "account.username",
                    "Username cannot be empty",
                ));
            }
            if self.account.password.is_empty() {
                return Err(DominionError::validation(
                    "account.password",
                    "Password cannot be empty",
                ));
            }
        }

        for (field, url) in [
            ("endpoints.login_base", &self.endpoints.login_base),
            ("endpoints.api_base", &self.endpoints.api_base),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(DominionError::validation(
                    field,
                    "Must be an http(s) URL",
                ));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(DominionError::validation(
                "http.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        self.tz()?;
        crate::logging::parse_log_level(&self.logging.level)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.account.username = "user@example.com".to_string();
        config.account.password = "hunter2".to_string();
        config.account.account_number = "123456789".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval_seconds, 43_200);
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.endpoints.login_base, DEFAULT_LOGIN_BASE);
        assert_eq!(config.endpoints.api_base, DEFAULT_API_BASE);
        assert!(config.account.token.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.account.account_number = String::new();
        assert!(config.validate().is_err());

        config = valid_config();
        config.account.password = String::new();
        assert!(config.validate().is_err());

        // A configured token stands in for username/password
        config.account.username = String::new();
        config.account.token = Some("abc".to_string());
        assert!(config.validate().is_ok());

        config = valid_config();
        config.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        config = valid_config();
        config.endpoints.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config = valid_config();
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "DOMINION_USERNAME" => Some(" user@example.com ".to_string()),
            "DOMINION_ACCOUNT_NUMBER" => Some("987".to_string()),
            "DOMINION_TOKEN" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.account.username, "user@example.com");
        assert_eq!(config.account.account_number, "987");
        assert!(config.account.token.is_none());
        assert_eq!(config.logging.level, "INFO");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "account:\n  username: a\n  password: b\n  account_number: '42'\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.account.account_number, "42");
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = valid_config();
        config.account.token = Some("secret-token".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret-token"));
        assert!(!format!("{:?}", config.credentials()).contains("hunter2"));
    }
}
