//! Concurrent admission against one on-disk database, one connection per thread.

use gymbook_core::db::open_db;
use gymbook_core::{
    Activity, ActivityId, ActivityRepository, EnrollmentEngine, EnrollmentService, Role,
    SqliteActivityRepository, SqliteEnrollmentRepository, SqliteUserRepository, User, UserId,
    UserRepository,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;

type Outcome = Result<(), &'static str>;

fn create_users(path: &Path, count: usize) -> Vec<UserId> {
    let conn = open_db(path).unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    (0..count)
        .map(|index| {
            let user = User::new(
                format!("member-{index}"),
                format!("member-{index}@example.com"),
                Role::Member,
            );
            repo.create_user(&user).unwrap()
        })
        .collect()
}

fn create_activity(path: &Path, start: &str, end: &str, capacity: u32) -> ActivityId {
    let conn = open_db(path).unwrap();
    let repo = SqliteActivityRepository::try_new(&conn).unwrap();
    let activity = Activity::new("Spinning", "cardio", "Coach", 4, start, end, capacity);
    repo.create_activity(&activity).unwrap()
}

/// Runs every `(user, activity)` attempt on its own thread, released together.
fn enroll_concurrently(path: &Path, attempts: Vec<(UserId, ActivityId)>) -> Vec<Outcome> {
    let barrier = Arc::new(Barrier::new(attempts.len()));
    let handles = attempts
        .into_iter()
        .map(|(user_id, activity_id)| {
            let path: PathBuf = path.to_path_buf();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Outcome {
                let conn = open_db(&path).unwrap();
                let service = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn).unwrap());
                barrier.wait();
                service
                    .enroll(user_id, activity_id)
                    .map(|_| ())
                    .map_err(|err| err.error_code())
            })
        })
        .collect::<Vec<_>>();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

fn active_count(path: &Path, activity_id: ActivityId) -> i64 {
    let conn = open_db(path).unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM enrollments WHERE activity_id = ?1 AND status = 'active';",
        [activity_id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn concurrent_enrolls_admit_exactly_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gymbook.db");
    let capacity = 3;
    let users = create_users(&path, 12);
    let activity = create_activity(&path, "19:30", "20:15", capacity);

    let outcomes = enroll_concurrently(
        &path,
        users.iter().map(|user| (*user, activity)).collect(),
    );

    let admitted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(admitted, capacity as usize);
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.err())
        .all(|code| code == "no_capacity"));
    assert_eq!(active_count(&path, activity), i64::from(capacity));
}

#[test]
fn two_members_racing_for_the_last_slot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gymbook.db");
    let users = create_users(&path, 2);
    let activity = create_activity(&path, "07:00", "08:00", 1);

    let outcomes = enroll_concurrently(&path, vec![(users[0], activity), (users[1], activity)]);

    let mut sorted = outcomes.clone();
    sorted.sort();
    assert_eq!(sorted, vec![Ok(()), Err("no_capacity")]);
    assert_eq!(active_count(&path, activity), 1);
}

#[test]
fn same_member_racing_itself_is_enrolled_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gymbook.db");
    let user = create_users(&path, 1)[0];
    let activity = create_activity(&path, "07:00", "08:00", 10);

    let outcomes = enroll_concurrently(&path, vec![(user, activity); 6]);

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.err())
        .all(|code| code == "already_enrolled"));
    assert_eq!(active_count(&path, activity), 1);
}

#[test]
fn racing_into_overlapping_activities_admits_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gymbook.db");
    let user = create_users(&path, 1)[0];
    let early = create_activity(&path, "07:00", "08:00", 10);
    let late = create_activity(&path, "07:30", "08:30", 10);

    let outcomes = enroll_concurrently(&path, vec![(user, early), (user, late)]);

    let mut sorted = outcomes.clone();
    sorted.sort();
    assert_eq!(sorted, vec![Ok(()), Err("schedule_conflict")]);
}
