//! Domain model for activities, enrollments and members.
//!
//! # Responsibility
//! - Define canonical data structures used by the enrollment engine.
//! - Keep derived availability separate from persisted activity state.
//!
//! # Invariants
//! - Every record is identified by a stable `Uuid`.
//! - Enrollments are cancelled, never deleted.

pub mod activity;
pub mod enrollment;
pub mod user;
