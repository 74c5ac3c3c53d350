//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into enroll/unenroll/list use cases.
//! - Annotate catalog reads with live availability.
//! - Keep transport layers decoupled from storage details.

pub mod activity_service;
pub mod enrollment_service;
