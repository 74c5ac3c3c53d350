//! CLI error type and exit-status mapping.

use gymbook_core::db::DbError;
use gymbook_core::{ConfigError, EnrollError, LoggingError, RepoError, UnenrollError};

/// Exit status for rejected member requests.
pub const EXIT_DOMAIN: i32 = 2;
/// Exit status for configuration, storage or integrity failures.
pub const EXIT_INTERNAL: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("database error: {0}")]
    Db(#[from] DbError),
    #[error("store error: {0}")]
    Repo(#[from] RepoError),
    #[error("{0}")]
    Enroll(#[from] EnrollError),
    #[error("{0}")]
    Unenroll(#[from] UnenrollError),
    #[error("output error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Machine-readable code printed next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Logging(_) => "logging_error",
            Self::Db(_) | Self::Repo(_) => "store_error",
            Self::Enroll(err) => err.error_code(),
            Self::Unenroll(err) => err.error_code(),
            Self::Json(_) => "output_error",
        }
    }

    pub fn exit_code(&self) -> i32 {
        let domain = match self {
            Self::Enroll(err) => err.is_domain(),
            Self::Unenroll(err) => err.is_domain(),
            _ => false,
        };
        if domain {
            EXIT_DOMAIN
        } else {
            EXIT_INTERNAL
        }
    }
}
