//! Enrollment domain model.
//!
//! # Invariants
//! - A new enrollment always starts `Active`.
//! - The only transition is `Active -> Cancelled`; re-enrolling creates a new row.
//! - Timestamps are Unix epoch milliseconds assigned by storage.

use crate::model::activity::{ActivityId, ActivitySummary};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Stable identifier of one enrollment row.
pub type EnrollmentId = uuid::Uuid;

/// Enrollment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Counts against capacity and schedule conflicts.
    Active,
    /// Terminal. Kept as history.
    Cancelled,
}

impl EnrollmentStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether `self -> next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Active, Self::Cancelled))
    }
}

/// One member's enrollment in one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub activity_id: ActivityId,
    pub status: EnrollmentStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Active enrollment joined with the display fields of its activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentWithActivity {
    pub enrollment: Enrollment,
    pub activity: ActivitySummary,
}

#[cfg(test)]
mod tests {
    use super::EnrollmentStatus;

    #[test]
    fn only_active_to_cancelled_is_legal() {
        assert!(EnrollmentStatus::Active.can_transition_to(EnrollmentStatus::Cancelled));
        assert!(!EnrollmentStatus::Cancelled.can_transition_to(EnrollmentStatus::Active));
        assert!(!EnrollmentStatus::Active.can_transition_to(EnrollmentStatus::Active));
        assert!(!EnrollmentStatus::Cancelled.can_transition_to(EnrollmentStatus::Cancelled));
    }

    #[test]
    fn status_storage_strings_are_stable() {
        for status in [EnrollmentStatus::Active, EnrollmentStatus::Cancelled] {
            assert_eq!(EnrollmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EnrollmentStatus::parse("inscripto"), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&EnrollmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
