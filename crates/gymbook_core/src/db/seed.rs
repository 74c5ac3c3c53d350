//! Development sample data.
//!
//! Only fills tables that are empty, so repeated runs are no-ops.

use crate::model::activity::Activity;
use crate::model::user::{Role, User};
use crate::repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::Connection;

/// Rows inserted by one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub activities_created: usize,
}

/// Seeds sample members and activities into empty tables.
pub fn seed_dev_data(conn: &Connection) -> RepoResult<SeedReport> {
    let mut report = SeedReport::default();

    if table_is_empty(conn, "users")? {
        let users = SqliteUserRepository::try_new(conn)?;
        for user in sample_users() {
            users.create_user(&user)?;
            report.users_created += 1;
        }
    }

    if table_is_empty(conn, "activities")? {
        let activities = SqliteActivityRepository::try_new(conn)?;
        for activity in sample_activities() {
            activities.create_activity(&activity)?;
            report.activities_created += 1;
        }
    }

    info!(
        "event=seed module=db status=ok users_created={} activities_created={}",
        report.users_created, report.activities_created
    );
    Ok(report)
}

fn sample_users() -> Vec<User> {
    vec![
        User::new("Admin", "admin@example.com", Role::Admin),
        User::new("Demo Member", "member@example.com", Role::Member),
    ]
}

fn sample_activities() -> Vec<Activity> {
    let mut yoga = Activity::new("Sunrise Yoga", "yoga", "Lucia Perez", 1, "07:30", "08:30", 20);
    yoga.description = "Morning yoga for mobility and breathing.".to_string();

    let mut functional = Activity::new(
        "Functional Training",
        "strength",
        "Carlos Diaz",
        2,
        "18:00",
        "19:00",
        18,
    );
    functional.description = "Strength and general conditioning.".to_string();

    let mut spinning = Activity::new("Spinning", "cardio", "Agus Flores", 4, "19:30", "20:15", 15);
    spinning.description = "High-intensity indoor cycling.".to_string();

    vec![yoga, functional, spinning]
}

fn table_is_empty(conn: &Connection, table: &'static str) -> RepoResult<bool> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    Ok(count == 0)
}
