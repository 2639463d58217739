//! Schedule and timeline domain model.
//!
//! # Responsibility
//! - Normalize raw schedule input into immutable entries.
//! - Derive timeline bounds and map slider positions onto dates.
//!
//! # Invariants
//! - Bad dates are absorbed as `None`; they never escalate as errors.
//! - Bounds are always derived from the same entry generation they describe.

pub mod date;
pub mod schedule;
pub mod timeline;
