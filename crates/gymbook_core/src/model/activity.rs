//! Activity domain model.
//!
//! Activities belong to the catalog; the enrollment engine only reads their
//! capacity, active flag and weekly window.
//!
//! # Invariants
//! - `day_of_week` is in `0..=6` (0 = Sunday).
//! - `start_time < end_time`, both same-day wall-clock `HH:MM` values.
//! - `capacity > 0`.
//! - Enrolled count and free slots are never stored on the activity.

use crate::rules::schedule::{ScheduleError, WeeklyWindow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a catalog activity.
pub type ActivityId = Uuid;

/// A recurring weekly activity slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub instructor: String,
    pub image_url: Option<String>,
    /// 0 = Sunday ... 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    /// Maximum number of simultaneously active enrollments.
    pub capacity: u32,
    pub is_active: bool,
}

impl Activity {
    /// Creates an active activity with a generated id and empty description.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        instructor: impl Into<String>,
        day_of_week: u8,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        capacity: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            instructor: instructor.into(),
            image_url: None,
            day_of_week,
            start_time: start_time.into(),
            end_time: end_time.into(),
            capacity,
            is_active: true,
        }
    }

    /// Parses the weekly window of this activity.
    pub fn window(&self) -> Result<WeeklyWindow, ScheduleError> {
        WeeklyWindow::parse(self.day_of_week, &self.start_time, &self.end_time)
    }

    /// Checks catalog write invariants.
    pub fn validate(&self) -> Result<(), ActivityValidationError> {
        for (field, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("instructor", &self.instructor),
        ] {
            if value.trim().is_empty() {
                return Err(ActivityValidationError::EmptyField(field));
            }
        }
        if self.capacity == 0 {
            return Err(ActivityValidationError::ZeroCapacity);
        }
        self.window()?;
        Ok(())
    }

    /// Display fields shown next to a member's enrollment.
    pub fn summary(&self) -> ActivitySummary {
        ActivitySummary {
            id: self.id,
            title: self.title.clone(),
            category: self.category.clone(),
            instructor: self.instructor.clone(),
            day_of_week: self.day_of_week,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}

/// Catalog write validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityValidationError {
    #[error("activity {0} cannot be empty")]
    EmptyField(&'static str),
    #[error("activity capacity must be greater than zero")]
    ZeroCapacity,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Activity display projection returned by member listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: ActivityId,
    pub title: String,
    pub category: String,
    pub instructor: String,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

/// Activity annotated with live availability.
///
/// Always recomputed from active enrollments on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityAvailability {
    #[serde(flatten)]
    pub activity: Activity,
    pub enrolled_count: u32,
    pub available_slots: u32,
}
