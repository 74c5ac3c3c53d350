//! Pure admission and projection rules.
//!
//! # Responsibility
//! - Decide weekly schedule overlap between two activities.
//! - Decide whether an activity has room for one more active enrollment.
//! - Project enrolled/available counts onto activity read models.
//!
//! # Invariants
//! - Nothing in this module touches storage or logs.
//! - Malformed schedule data is an error, never "no overlap".

pub mod availability;
pub mod capacity;
pub mod schedule;
