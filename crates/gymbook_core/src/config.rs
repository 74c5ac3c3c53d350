//! Engine configuration from environment variables.
//!
//! | Variable            | Meaning                                   | Default            |
//! |---------------------|-------------------------------------------|--------------------|
//! | `GYMBOOK_DB_PATH`   | SQLite database file                      | none (in-memory)   |
//! | `GYMBOOK_LOG_LEVEL` | `trace|debug|info|warn|error`             | build-mode default |
//! | `GYMBOOK_LOG_DIR`   | absolute directory for rolling log files  | log to stderr      |
//! | `GYMBOOK_APP_ENV`   | `dev` or `prod`; `dev` seeds sample data  | `prod`             |

use crate::logging::{default_log_level, normalize_level, LoggingConfig, LoggingError};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "GYMBOOK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "GYMBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GYMBOOK_LOG_DIR";
pub const ENV_APP_ENV: &str = "GYMBOOK_APP_ENV";

/// Deployment flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    Dev,
    #[default]
    Prod,
}

impl AppEnv {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Some(Self::Dev),
            "prod" | "production" => Some(Self::Prod),
            _ => None,
        }
    }

    /// Whether sample data may be seeded into empty tables.
    pub fn seeds_sample_data(self) -> bool {
        self == Self::Dev
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is set but empty")]
    EmptyValue(&'static str),
    #[error("unsupported GYMBOOK_APP_ENV value `{0}`; expected dev|prod")]
    InvalidAppEnv(String),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub app_env: AppEnv,
}

impl EngineConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value of a key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
                other => Ok(other),
            }
        };

        let log_level = match non_empty(ENV_LOG_LEVEL)? {
            Some(value) => normalize_level(&value)?,
            None => default_log_level(),
        };
        let logging = match non_empty(ENV_LOG_DIR)? {
            Some(dir) => LoggingConfig::new(log_level, dir.trim())?,
            None => LoggingConfig::stderr(log_level)?,
        };
        let app_env = match non_empty(ENV_APP_ENV)? {
            Some(value) => AppEnv::parse(&value).ok_or(ConfigError::InvalidAppEnv(value))?,
            None => AppEnv::default(),
        };

        Ok(Self {
            db_path: non_empty(ENV_DB_PATH)?.map(PathBuf::from),
            logging,
            app_env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AppEnv, ConfigError, EngineConfig};
    use crate::logging::LoggingError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, None);
        assert_eq!(config.app_env, AppEnv::Prod);
        assert_eq!(config.logging.level, crate::logging::default_log_level());
        assert_eq!(config.logging.log_dir, None);
    }

    #[test]
    fn explicit_values_are_normalized() {
        let log_dir = std::env::temp_dir().join("gymbook-config-test");
        let log_dir_text = log_dir.to_str().unwrap();
        let config = config_from(&[
            ("GYMBOOK_DB_PATH", "/var/lib/gymbook/gym.db"),
            ("GYMBOOK_LOG_LEVEL", "WARNING"),
            ("GYMBOOK_LOG_DIR", log_dir_text),
            ("GYMBOOK_APP_ENV", "Dev"),
        ])
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/gymbook/gym.db")));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.log_dir, Some(log_dir));
        assert!(config.app_env.seeds_sample_data());
    }

    #[test]
    fn log_level_applies_to_stderr_logging_without_a_directory() {
        let config = config_from(&[("GYMBOOK_LOG_LEVEL", "error")]).unwrap();
        assert_eq!(config.logging.level, "error");
        assert_eq!(config.logging.log_dir, None);
    }

    #[test]
    fn empty_values_are_rejected() {
        let err = config_from(&[("GYMBOOK_DB_PATH", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue("GYMBOOK_DB_PATH")));
    }

    #[test]
    fn unknown_app_env_is_rejected() {
        let err = config_from(&[("GYMBOOK_APP_ENV", "staging")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAppEnv(value) if value == "staging"));
    }

    #[test]
    fn invalid_log_settings_surface_logging_errors() {
        let err = config_from(&[("GYMBOOK_LOG_LEVEL", "loud")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Logging(LoggingError::UnsupportedLevel(_))
        ));

        let err = config_from(&[("GYMBOOK_LOG_DIR", "relative/logs")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Logging(LoggingError::RelativeLogDir(_))
        ));
    }
}
