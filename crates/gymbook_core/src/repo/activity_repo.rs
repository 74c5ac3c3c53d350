//! Activity catalog repository contracts and SQLite implementation.
//!
//! The catalog owns activity rows; the enrollment engine reads them through
//! [`load_activity`] inside its own transaction.
//!
//! # Invariants
//! - Write paths call `Activity::validate()` before SQL mutations.
//! - Time strings are returned as stored; the rules layer parses them.

use crate::model::activity::{Activity, ActivityId};
use crate::repo::{
    bool_to_int, ensure_schema_ready, parse_count, parse_day_of_week, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    instructor,
    image_url,
    day_of_week,
    start_time,
    end_time,
    capacity,
    is_active
FROM activities";

const ACTIVITY_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "category",
    "instructor",
    "image_url",
    "day_of_week",
    "start_time",
    "end_time",
    "capacity",
    "is_active",
];

/// Query options for listing catalog activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityListQuery {
    /// Include deactivated activities (admin views).
    pub include_inactive: bool,
}

/// Repository interface for the activity catalog.
pub trait ActivityRepository {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Lists activities ordered by `day_of_week, start_time, id`.
    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>>;
}

/// SQLite-backed activity repository.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &[("activities", ACTIVITY_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId> {
        activity.validate()?;

        self.conn.execute(
            "INSERT INTO activities (
                id,
                title,
                description,
                category,
                instructor,
                image_url,
                day_of_week,
                start_time,
                end_time,
                capacity,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                activity.id.to_string(),
                activity.title.as_str(),
                activity.description.as_str(),
                activity.category.as_str(),
                activity.instructor.as_str(),
                activity.image_url.as_deref(),
                i64::from(activity.day_of_week),
                activity.start_time.as_str(),
                activity.end_time.as_str(),
                i64::from(activity.capacity),
                bool_to_int(activity.is_active),
            ],
        )?;

        Ok(activity.id)
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        load_activity(self.conn, id)
    }

    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             WHERE (?1 = 1 OR is_active = 1)
             ORDER BY day_of_week ASC, start_time ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(query.include_inactive)])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }
}

/// Loads one activity regardless of its active flag.
pub(crate) fn load_activity(conn: &Connection, id: ActivityId) -> RepoResult<Option<Activity>> {
    let mut stmt = conn.prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_activity_row(row)?));
    }
    Ok(None)
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let id_text: String = row.get("id")?;
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in activities.is_active"
            )));
        }
    };

    Ok(Activity {
        id: parse_uuid(&id_text, "activities.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        instructor: row.get("instructor")?,
        image_url: row.get("image_url")?,
        day_of_week: parse_day_of_week(row.get("day_of_week")?, "activities.day_of_week")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        capacity: parse_count(row.get("capacity")?, "activities.capacity")?,
        is_active,
    })
}
