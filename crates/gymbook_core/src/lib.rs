//! Enrollment engine for recurring weekly gym activities.
//! This crate is the single source of truth for admission invariants:
//! no over-booking, one active enrollment per member and activity, and no
//! overlapping weekly schedules for a member.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rules;
pub mod service;

pub use config::{AppEnv, ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::activity::{
    Activity, ActivityAvailability, ActivityId, ActivitySummary, ActivityValidationError,
};
pub use model::enrollment::{Enrollment, EnrollmentId, EnrollmentStatus, EnrollmentWithActivity};
pub use model::user::{Role, User, UserId};
pub use repo::activity_repo::{ActivityListQuery, ActivityRepository, SqliteActivityRepository};
pub use repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use rules::schedule::{schedules_overlap, ScheduleError, WeeklyWindow};
pub use service::activity_service::ActivityService;
pub use service::enrollment_service::{
    EnrollError, EnrollmentEngine, EnrollmentService, UnenrollError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
