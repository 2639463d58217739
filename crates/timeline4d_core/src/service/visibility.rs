//! Visibility and theming evaluation.
//!
//! # Responsibility
//! - Partition element ids into visible and highlighted sets for a date.
//! - Push the partition to the scene as one full, ordered update.
//!
//! # Invariants
//! - `highlighted ⊆ visible` by construction.
//! - Entries missing either date are never shown nor highlighted.
//! - Scene updates always run hide-all, show, clear highlights, recolor, in
//!   that order, and fully supersede the previous visual state.
//! - Evaluation is idempotent: the result depends only on the inputs.

use crate::model::schedule::{ElementId, ScheduleEntry};
use crate::scene::{HighlightColor, SceneMutator};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use std::collections::BTreeSet;

/// Visible/highlighted element ids for one timeline position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityPartition {
    pub visible: BTreeSet<ElementId>,
    pub highlighted: BTreeSet<ElementId>,
}

impl VisibilityPartition {
    pub fn visible_ids(&self) -> Vec<ElementId> {
        self.visible.iter().copied().collect()
    }

    pub fn highlighted_ids(&self) -> Vec<ElementId> {
        self.highlighted.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

/// Computes the partition for calendar day `day`.
///
/// An entry is visible once `day >= start` and highlighted while also
/// `day <= end`. Both boundary days are inclusive.
pub fn partition_at(entries: &[ScheduleEntry], day: NaiveDate) -> VisibilityPartition {
    let mut partition = VisibilityPartition::default();
    for entry in entries {
        let Some((start, end)) = entry.span() else {
            continue;
        };
        if day < start {
            continue;
        }
        partition.visible.insert(entry.element_id);
        if day <= end {
            partition.highlighted.insert(entry.element_id);
        }
    }
    partition
}

/// Replaces the scene's visual state with `partition`.
pub fn apply_partition(
    partition: &VisibilityPartition,
    color: HighlightColor,
    scene: &mut dyn SceneMutator,
) {
    scene.hide_all();
    scene.show(&partition.visible_ids());
    scene.clear_highlights();
    for id in &partition.highlighted {
        scene.set_highlight(*id, Some(color));
    }
}

/// Computes and applies the partition for the timeline point `at`.
pub fn evaluate(
    entries: &[ScheduleEntry],
    at: NaiveDateTime,
    color: HighlightColor,
    scene: &mut dyn SceneMutator,
) -> VisibilityPartition {
    // Why: schedule dates carry no time of day; comparing calendar days keeps
    // an element highlighted for the whole of its end day.
    let partition = partition_at(entries, at.date());
    apply_partition(&partition, color, scene);
    debug!(
        "event=visibility_evaluate module=service status=ok at={} visible={} highlighted={}",
        at,
        partition.visible.len(),
        partition.highlighted.len()
    );
    partition
}
