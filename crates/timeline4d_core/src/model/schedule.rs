//! Schedule records and normalized schedule entries.
//!
//! # Responsibility
//! - Define the raw wire shape delivered by the schedule source.
//! - Normalize raw records into immutable `ScheduleEntry` values.
//!
//! # Invariants
//! - Entries are built once at load time and never mutated afterwards.
//! - An entry missing either date is kept, but never shown or highlighted.

use crate::model::date::normalize_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of one schedulable model element.
///
/// Shares its value space with scene node ids: a leaf node id is the element id.
pub type ElementId = i64;

/// Raw schedule record as delivered by the data-fetch layer.
///
/// Serialized with camelCase keys to match the external payload
/// (`elementId`, `startDate`, `endDate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub element_id: ElementId,
    /// Expected `YYYY-MM-DD`; `null`, absent, or garbage all normalize to `None`.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Normalized per-element schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub element_id: ElementId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ScheduleEntry {
    pub fn new(
        element_id: ElementId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            element_id,
            start_date,
            end_date,
        }
    }

    /// Normalizes one raw record. Unparsable dates become `None`.
    pub fn from_record(record: &ScheduleRecord) -> Self {
        Self::new(
            record.element_id,
            normalize_date(record.start_date.as_deref()),
            normalize_date(record.end_date.as_deref()),
        )
    }

    /// Returns `(start, end)` when both dates are present.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date?, self.end_date?))
    }

    /// Whether this entry takes part in visibility computation.
    pub fn is_complete(&self) -> bool {
        self.span().is_some()
    }
}

/// Normalizes a full record list, preserving input order.
pub fn normalize_records(records: &[ScheduleRecord]) -> Vec<ScheduleEntry> {
    records.iter().map(ScheduleEntry::from_record).collect()
}
