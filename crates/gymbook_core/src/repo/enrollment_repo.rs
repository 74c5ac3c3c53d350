//! Enrollment store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the reads and writes the enrollment engine composes.
//! - Offer one write-transaction scope so admission checks and the insert
//!   observe the same committed state.
//!
//! # Invariants
//! - Rows are never deleted; cancellation is a status update.
//! - At most one `active` row per `(user_id, activity_id)`, enforced by a
//!   partial unique index in addition to the engine's own check.
//! - Status updates are compare-and-set on the previous status.

use crate::model::activity::{Activity, ActivityId, ActivitySummary};
use crate::model::enrollment::{
    Enrollment, EnrollmentId, EnrollmentStatus, EnrollmentWithActivity,
};
use crate::model::user::UserId;
use crate::repo::activity_repo::load_activity;
use crate::repo::{
    ensure_schema_ready, parse_count, parse_day_of_week, parse_uuid, RepoError, RepoResult,
};
use crate::rules::availability::ActiveCounts;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const ENROLLMENT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    activity_id,
    status,
    created_at,
    updated_at
FROM enrollments";

/// Store operations consumed by the enrollment engine.
pub trait EnrollmentRepository {
    /// Runs `op` inside one exclusive write transaction.
    ///
    /// Commits when `op` returns `Ok`, rolls back otherwise. Concurrent
    /// callers on the same database are serialized.
    fn in_write_transaction<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
    fn get_activity(&self, activity_id: ActivityId) -> RepoResult<Option<Activity>>;
    fn find_active_enrollment(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
    ) -> RepoResult<Option<Enrollment>>;
    fn count_active_enrollments(&self, activity_id: ActivityId) -> RepoResult<u32>;
    /// Active enrollments of one user joined with activity display fields.
    fn list_active_enrollments(&self, user_id: UserId) -> RepoResult<Vec<EnrollmentWithActivity>>;
    /// Inserts a new `active` row.
    fn create_enrollment(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
    ) -> RepoResult<Enrollment>;
    fn update_enrollment_status(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> RepoResult<()>;
    /// Active enrollment counts grouped by activity. Absent ids mean zero.
    fn count_active_by_activity(&self, activity_ids: &[ActivityId]) -> RepoResult<ActiveCounts>;
}

/// SQLite-backed enrollment repository.
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(
            conn,
            &[(
                "enrollments",
                &[
                    "id",
                    "user_id",
                    "activity_id",
                    "status",
                    "created_at",
                    "updated_at",
                ],
            )],
        )?;
        Ok(Self { conn })
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn in_write_transaction<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = op(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }

    fn get_activity(&self, activity_id: ActivityId) -> RepoResult<Option<Activity>> {
        load_activity(self.conn, activity_id)
    }

    fn find_active_enrollment(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
    ) -> RepoResult<Option<Enrollment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENROLLMENT_SELECT_SQL}
             WHERE user_id = ?1
               AND activity_id = ?2
               AND status = 'active';"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), activity_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_enrollment_row(row)?));
        }
        Ok(None)
    }

    fn count_active_enrollments(&self, activity_id: ActivityId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM enrollments
             WHERE activity_id = ?1
               AND status = 'active';",
            [activity_id.to_string()],
            |row| row.get(0),
        )?;
        parse_count(count, "COUNT(enrollments)")
    }

    fn list_active_enrollments(&self, user_id: UserId) -> RepoResult<Vec<EnrollmentWithActivity>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                e.id,
                e.user_id,
                e.activity_id,
                e.status,
                e.created_at,
                e.updated_at,
                a.title,
                a.category,
                a.instructor,
                a.day_of_week,
                a.start_time,
                a.end_time
             FROM enrollments e
             INNER JOIN activities a ON a.id = e.activity_id
             WHERE e.user_id = ?1
               AND e.status = 'active'
             ORDER BY a.day_of_week ASC, a.start_time ASC, e.id ASC;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let enrollment = parse_enrollment_row(row)?;
            let activity = ActivitySummary {
                id: enrollment.activity_id,
                title: row.get("title")?,
                category: row.get("category")?,
                instructor: row.get("instructor")?,
                day_of_week: parse_day_of_week(row.get("day_of_week")?, "activities.day_of_week")?,
                start_time: row.get("start_time")?,
                end_time: row.get("end_time")?,
            };
            items.push(EnrollmentWithActivity {
                enrollment,
                activity,
            });
        }
        Ok(items)
    }

    fn create_enrollment(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
    ) -> RepoResult<Enrollment> {
        let enrollment_id = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO enrollments (id, user_id, activity_id, status)
             VALUES (?1, ?2, ?3, 'active');",
            params![
                enrollment_id.to_string(),
                user_id.to_string(),
                activity_id.to_string(),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicateActiveEnrollment {
                    user_id,
                    activity_id,
                });
            }
            Err(err) => return Err(err.into()),
        }

        load_enrollment(self.conn, enrollment_id)?.ok_or(RepoError::NotFound {
            entity: "enrollment",
            id: enrollment_id,
        })
    }

    fn update_enrollment_status(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> RepoResult<()> {
        let current = load_enrollment(self.conn, enrollment_id)?.ok_or(RepoError::NotFound {
            entity: "enrollment",
            id: enrollment_id,
        })?;
        if !current.status.can_transition_to(status) {
            return Err(RepoError::IllegalTransition {
                from: current.status,
                to: status,
            });
        }

        let changed = self.conn.execute(
            "UPDATE enrollments
             SET status = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND status = ?3;",
            params![
                enrollment_id.to_string(),
                status.as_str(),
                current.status.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "enrollment",
                id: enrollment_id,
            });
        }
        Ok(())
    }

    fn count_active_by_activity(&self, activity_ids: &[ActivityId]) -> RepoResult<ActiveCounts> {
        let mut counts = ActiveCounts::with_capacity(activity_ids.len());
        if activity_ids.is_empty() {
            return Ok(counts);
        }

        let placeholders = vec!["?"; activity_ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT activity_id, COUNT(*) AS active_count
             FROM enrollments
             WHERE status = 'active'
               AND activity_id IN ({placeholders})
             GROUP BY activity_id;"
        ))?;
        let mut rows = stmt.query(params_from_iter(
            activity_ids.iter().map(|id| id.to_string()),
        ))?;
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("activity_id")?;
            let activity_id = parse_uuid(&id_text, "enrollments.activity_id")?;
            let count = parse_count(row.get("active_count")?, "COUNT(enrollments)")?;
            counts.insert(activity_id, count);
        }
        Ok(counts)
    }
}

fn load_enrollment(conn: &Connection, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
    conn.query_row(
        &format!("{ENROLLMENT_SELECT_SQL} WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(parse_enrollment_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_enrollment_row(row: &Row<'_>) -> RepoResult<Enrollment> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let activity_text: String = row.get("activity_id")?;
    let status_text: String = row.get("status")?;
    let status = EnrollmentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in enrollments.status"
        ))
    })?;

    Ok(Enrollment {
        id: parse_uuid(&id_text, "enrollments.id")?,
        user_id: parse_uuid(&user_text, "enrollments.user_id")?,
        activity_id: parse_uuid(&activity_text, "enrollments.activity_id")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
