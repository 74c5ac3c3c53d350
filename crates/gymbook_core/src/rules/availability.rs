//! Availability projection for activity read paths.
//!
//! Counting happens in the repository (`count_active_by_activity`); this
//! module only turns counts into read models. Admission never uses it.

use crate::model::activity::{Activity, ActivityAvailability, ActivityId};
use crate::rules::capacity::available_slots;
use std::collections::HashMap;

/// Active enrollment count per activity. Missing keys mean zero.
pub type ActiveCounts = HashMap<ActivityId, u32>;

/// Annotates one activity with its live counts.
pub fn project(activity: Activity, counts: &ActiveCounts) -> ActivityAvailability {
    let enrolled_count = counts.get(&activity.id).copied().unwrap_or(0);
    ActivityAvailability {
        available_slots: available_slots(enrolled_count, activity.capacity),
        enrolled_count,
        activity,
    }
}

/// Annotates activities, preserving input order.
pub fn project_all(activities: Vec<Activity>, counts: &ActiveCounts) -> Vec<ActivityAvailability> {
    activities
        .into_iter()
        .map(|activity| project(activity, counts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{project, project_all, ActiveCounts};
    use crate::model::activity::Activity;

    fn activity(capacity: u32) -> Activity {
        Activity::new("Spinning", "cardio", "Agus", 4, "19:30", "20:15", capacity)
    }

    #[test]
    fn absent_activity_counts_as_zero() {
        let projected = project(activity(15), &ActiveCounts::new());
        assert_eq!(projected.enrolled_count, 0);
        assert_eq!(projected.available_slots, 15);
    }

    #[test]
    fn over_capacity_counts_clamp_available_slots() {
        let target = activity(2);
        let counts = ActiveCounts::from([(target.id, 3)]);
        let projected = project(target, &counts);
        assert_eq!(projected.enrolled_count, 3);
        assert_eq!(projected.available_slots, 0);
    }

    #[test]
    fn project_all_keeps_order_and_matches_ids() {
        let first = activity(10);
        let second = activity(5);
        let counts = ActiveCounts::from([(second.id, 4)]);
        let ids = [first.id, second.id];

        let projected = project_all(vec![first, second], &counts);
        assert_eq!(
            projected.iter().map(|item| item.activity.id).collect::<Vec<_>>(),
            ids
        );
        assert_eq!(projected[0].available_slots, 10);
        assert_eq!(projected[1].enrolled_count, 4);
        assert_eq!(projected[1].available_slots, 1);
    }
}
