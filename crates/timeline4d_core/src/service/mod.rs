//! Core timeline and scene services.
//!
//! # Responsibility
//! - Evaluate visibility/highlight partitions for a timeline position.
//! - Aggregate scene-graph leaves per top-level category.
//! - Relay external selection state with typed per-element properties.
//!
//! # Invariants
//! - Services hold no state between calls; the engine owns all state.

pub mod category;
pub mod selection;
pub mod visibility;
