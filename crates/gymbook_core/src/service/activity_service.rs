//! Catalog read paths with live availability.
//!
//! # Invariants
//! - `enrolled_count` / `available_slots` are recomputed on every call.
//! - Nothing here participates in admission decisions.

use crate::model::activity::{Activity, ActivityAvailability, ActivityId};
use crate::repo::activity_repo::{ActivityListQuery, ActivityRepository};
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::repo::RepoResult;
use crate::rules::availability::{project, project_all, ActiveCounts};

/// Use-case service over the catalog and the enrollment counts.
pub struct ActivityService<A: ActivityRepository, E: EnrollmentRepository> {
    activities: A,
    enrollments: E,
}

impl<A: ActivityRepository, E: EnrollmentRepository> ActivityService<A, E> {
    pub fn new(activities: A, enrollments: E) -> Self {
        Self {
            activities,
            enrollments,
        }
    }

    /// Persists a validated activity. A new activity has no enrollments.
    pub fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityAvailability> {
        self.activities.create_activity(activity)?;
        Ok(project(activity.clone(), &ActiveCounts::new()))
    }

    pub fn get_activity(&self, id: ActivityId) -> RepoResult<Option<ActivityAvailability>> {
        let Some(activity) = self.activities.get_activity(id)? else {
            return Ok(None);
        };
        let counts = self.enrollments.count_active_by_activity(&[activity.id])?;
        Ok(Some(project(activity, &counts)))
    }

    pub fn list_activities(
        &self,
        query: &ActivityListQuery,
    ) -> RepoResult<Vec<ActivityAvailability>> {
        let activities = self.activities.list_activities(query)?;
        let ids = activities
            .iter()
            .map(|activity| activity.id)
            .collect::<Vec<_>>();
        let counts = self.enrollments.count_active_by_activity(&ids)?;
        Ok(project_all(activities, &counts))
    }
}
