//! Selection relay and typed property index.
//!
//! # Responsibility
//! - Shape an external selection-changed signal into a `SelectionReport`.
//! - Index an element's property bag once per query so lookups are keyed,
//!   not repeated linear scans by display name.
//!
//! # Invariants
//! - Selection ids are relayed as given (deduplicated, order kept); the core
//!   never computes selection itself.
//! - When a property name repeats, the first occurrence wins.

use crate::model::schedule::ElementId;
use crate::service::category::{category_key, CategoryCounts, UNNAMED_CATEGORY};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One untyped `(display name, display value)` pair from the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperty {
    pub display_name: String,
    pub display_value: String,
}

impl RawProperty {
    pub fn new(display_name: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            display_value: display_value.into(),
        }
    }
}

/// Typed property key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    Category,
    Name,
    Level,
    Other(String),
}

impl PropertyKey {
    /// Resolves a viewer display name (case-insensitive) to a key.
    pub fn from_display_name(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "category" => Self::Category,
            "name" => Self::Name,
            "level" | "base constraint" | "reference level" => Self::Level,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

/// Property lookup capability of the hosting viewer.
pub trait PropertySource {
    /// Returns the raw property bag of `id`, or `None` for unknown ids.
    fn properties(&self, id: ElementId) -> Option<Vec<RawProperty>>;
}

/// Keyed view over one element's properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyIndex {
    values: BTreeMap<PropertyKey, String>,
}

impl PropertyIndex {
    pub fn build(properties: &[RawProperty]) -> Self {
        let mut values = BTreeMap::new();
        for property in properties {
            values
                .entry(PropertyKey::from_display_name(&property.display_name))
                .or_insert_with(|| property.display_value.trim().to_string());
        }
        Self { values }
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn category(&self) -> Option<&str> {
        self.get(&PropertyKey::Category)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(&PropertyKey::Name)
    }

    pub fn level(&self) -> Option<&str> {
        self.get(&PropertyKey::Level)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Relayed selection state for the reporting sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    pub ids: Vec<ElementId>,
    pub properties: BTreeMap<ElementId, PropertyIndex>,
}

impl SelectionReport {
    pub fn from_ids(ids: &[ElementId]) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let ids = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        Self {
            ids,
            properties: BTreeMap::new(),
        }
    }

    /// Attaches an index for every selected id the source knows about.
    pub fn with_properties<P: PropertySource + ?Sized>(mut self, source: &P) -> Self {
        self.properties = self
            .ids
            .iter()
            .filter_map(|id| {
                source
                    .properties(*id)
                    .map(|bag| (*id, PropertyIndex::build(&bag)))
            })
            .collect();
        self
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Selected elements per `Category` property value.
    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::new();
        for id in &self.ids {
            let key = self
                .properties
                .get(id)
                .and_then(PropertyIndex::category)
                .map(category_key)
                .unwrap_or_else(|| UNNAMED_CATEGORY.to_string());
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}
