//! Enrollment use-case service.
//!
//! # Responsibility
//! - Decide whether a member may join an activity and record the enrollment.
//! - Cancel enrollments and list a member's active ones.
//!
//! # Invariants
//! - Enroll checks run in a fixed order and stop at the first failure:
//!   not found, inactive, already enrolled, schedule conflict, capacity.
//! - Checks and the insert share one write transaction, so two callers can
//!   never both pass the capacity check against the same free slot.
//! - Domain rejections are returned as typed errors and never retried.

use crate::model::activity::{Activity, ActivityId};
use crate::model::enrollment::{Enrollment, EnrollmentStatus, EnrollmentWithActivity};
use crate::model::user::UserId;
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::repo::{RepoError, RepoResult};
use crate::rules::capacity::has_room;
use crate::rules::schedule::{ScheduleError, WeeklyWindow};
use log::{debug, error, info};
use std::time::Instant;

/// Enroll failure. Everything except `MalformedSchedule` and `Store` is an
/// expected, user-facing outcome.
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    #[error("activity not found: {0}")]
    ActivityNotFound(ActivityId),
    #[error("activity is not active: {0}")]
    ActivityInactive(ActivityId),
    #[error("user {user_id} already enrolled in activity {activity_id}")]
    AlreadyEnrolled {
        user_id: UserId,
        activity_id: ActivityId,
    },
    #[error("activity {activity_id} overlaps with active enrollment in {conflicting_activity_id}")]
    ScheduleConflict {
        activity_id: ActivityId,
        conflicting_activity_id: ActivityId,
    },
    #[error("activity {activity_id} has no remaining capacity (capacity {capacity})")]
    NoCapacity {
        activity_id: ActivityId,
        capacity: u32,
    },
    #[error("malformed schedule on activity {activity_id}: {source}")]
    MalformedSchedule {
        activity_id: ActivityId,
        #[source]
        source: ScheduleError,
    },
    #[error("enrollment store failure: {0}")]
    Store(#[source] RepoError),
}

impl EnrollError {
    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ActivityNotFound(_) => "activity_not_found",
            Self::ActivityInactive(_) => "activity_inactive",
            Self::AlreadyEnrolled { .. } => "already_enrolled",
            Self::ScheduleConflict { .. } => "schedule_conflict",
            Self::NoCapacity { .. } => "no_capacity",
            Self::MalformedSchedule { .. } => "malformed_schedule",
            Self::Store(_) => "store_error",
        }
    }

    /// Whether this is an expected outcome rather than a defect or outage.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::MalformedSchedule { .. } | Self::Store(_))
    }
}

impl From<RepoError> for EnrollError {
    fn from(value: RepoError) -> Self {
        match value {
            // The partial unique index caught a duplicate the read check missed.
            RepoError::DuplicateActiveEnrollment {
                user_id,
                activity_id,
            } => Self::AlreadyEnrolled {
                user_id,
                activity_id,
            },
            other => Self::Store(other),
        }
    }
}

/// Unenroll failure.
#[derive(Debug, thiserror::Error)]
pub enum UnenrollError {
    #[error("no active enrollment for user {user_id} in activity {activity_id}")]
    EnrollmentNotFound {
        user_id: UserId,
        activity_id: ActivityId,
    },
    #[error("enrollment store failure: {0}")]
    Store(#[from] RepoError),
}

impl UnenrollError {
    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EnrollmentNotFound { .. } => "enrollment_not_found",
            Self::Store(_) => "store_error",
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Self::EnrollmentNotFound { .. })
    }
}

/// Member-facing enrollment capabilities.
pub trait EnrollmentEngine {
    /// Enrolls `user_id` in `activity_id`, returning the new active row.
    fn enroll(&self, user_id: UserId, activity_id: ActivityId) -> Result<Enrollment, EnrollError>;
    /// Cancels the caller's active enrollment. Not idempotent: a second call
    /// reports `EnrollmentNotFound`.
    fn unenroll(&self, user_id: UserId, activity_id: ActivityId) -> Result<(), UnenrollError>;
    /// Active enrollments of `user_id` with activity display fields.
    fn list_mine(&self, user_id: UserId) -> RepoResult<Vec<EnrollmentWithActivity>>;
}

/// Enrollment engine over a transactional enrollment store.
pub struct EnrollmentService<R: EnrollmentRepository> {
    repo: R,
}

impl<R: EnrollmentRepository> EnrollmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

impl<R: EnrollmentRepository> EnrollmentEngine for EnrollmentService<R> {
    fn enroll(&self, user_id: UserId, activity_id: ActivityId) -> Result<Enrollment, EnrollError> {
        let started_at = Instant::now();
        let result = self
            .repo
            .in_write_transaction(|repo| admit(repo, user_id, activity_id));

        match &result {
            Ok(enrollment) => info!(
                "event=enroll module=service status=ok user_id={user_id} activity_id={activity_id} enrollment_id={} duration_ms={}",
                enrollment.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.is_domain() => info!(
                "event=enroll module=service status=rejected user_id={user_id} activity_id={activity_id} error_code={} duration_ms={}",
                err.error_code(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=enroll module=service status=error user_id={user_id} activity_id={activity_id} error_code={} duration_ms={} error={err}",
                err.error_code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn unenroll(&self, user_id: UserId, activity_id: ActivityId) -> Result<(), UnenrollError> {
        let started_at = Instant::now();
        let result = self.repo.in_write_transaction(|repo| -> Result<(), UnenrollError> {
            let not_found = || UnenrollError::EnrollmentNotFound {
                user_id,
                activity_id,
            };
            let enrollment = repo
                .find_active_enrollment(user_id, activity_id)?
                .ok_or_else(not_found)?;
            repo.update_enrollment_status(enrollment.id, EnrollmentStatus::Cancelled)
                .map_err(|err| match err {
                    RepoError::NotFound { .. } | RepoError::IllegalTransition { .. } => {
                        not_found()
                    }
                    other => UnenrollError::Store(other),
                })
        });

        match &result {
            Ok(()) => info!(
                "event=unenroll module=service status=ok user_id={user_id} activity_id={activity_id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.is_domain() => info!(
                "event=unenroll module=service status=rejected user_id={user_id} activity_id={activity_id} error_code={} duration_ms={}",
                err.error_code(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=unenroll module=service status=error user_id={user_id} activity_id={activity_id} error_code={} duration_ms={} error={err}",
                err.error_code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn list_mine(&self, user_id: UserId) -> RepoResult<Vec<EnrollmentWithActivity>> {
        self.repo.list_active_enrollments(user_id).map_err(|err| {
            error!(
                "event=list_mine module=service status=error user_id={user_id} error_code=store_error error={err}"
            );
            err
        })
    }
}

/// Admission checks and insert. Must run inside the write transaction.
fn admit<R: EnrollmentRepository>(
    repo: &R,
    user_id: UserId,
    activity_id: ActivityId,
) -> Result<Enrollment, EnrollError> {
    let activity = repo
        .get_activity(activity_id)?
        .ok_or(EnrollError::ActivityNotFound(activity_id))?;

    if !activity.is_active {
        return Err(EnrollError::ActivityInactive(activity_id));
    }

    if repo.find_active_enrollment(user_id, activity_id)?.is_some() {
        return Err(EnrollError::AlreadyEnrolled {
            user_id,
            activity_id,
        });
    }

    ensure_no_schedule_conflict(repo, user_id, &activity)?;

    let active_count = repo.count_active_enrollments(activity_id)?;
    if !has_room(active_count, activity.capacity) {
        return Err(EnrollError::NoCapacity {
            activity_id,
            capacity: activity.capacity,
        });
    }

    Ok(repo.create_enrollment(user_id, activity_id)?)
}

fn ensure_no_schedule_conflict<R: EnrollmentRepository>(
    repo: &R,
    user_id: UserId,
    target: &Activity,
) -> Result<(), EnrollError> {
    let target_window = target
        .window()
        .map_err(|source| EnrollError::MalformedSchedule {
            activity_id: target.id,
            source,
        })?;

    for existing in repo.list_active_enrollments(user_id)? {
        let summary = &existing.activity;
        if summary.day_of_week != target_window.day_of_week() {
            continue;
        }
        let existing_window =
            WeeklyWindow::parse(summary.day_of_week, &summary.start_time, &summary.end_time)
                .map_err(|source| EnrollError::MalformedSchedule {
                    activity_id: summary.id,
                    source,
                })?;
        if target_window.overlaps(&existing_window) {
            debug!(
                "event=schedule_conflict module=service status=rejected user_id={user_id} activity_id={} conflicting_activity_id={} target={target_window} existing={existing_window}",
                target.id,
                summary.id
            );
            return Err(EnrollError::ScheduleConflict {
                activity_id: target.id,
                conflicting_activity_id: summary.id,
            });
        }
    }

    Ok(())
}
