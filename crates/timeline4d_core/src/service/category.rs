//! Category aggregation over the scene graph.
//!
//! # Responsibility
//! - Bucket leaf elements under the root's immediate children.
//! - Strip bracketed suffixes from bucket names (`"Walls [123]"` -> `"Walls"`).
//!
//! # Invariants
//! - Every leaf descendant is counted exactly once per bucket walk.
//! - A top-level child that is itself a leaf counts as one element.
//! - Counts are rebuilt in full on each pass, never merged.

use crate::scene::{NodeId, SceneError, SceneQuery};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

static BRACKET_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[[^\]]*\]\s*$").expect("valid bracket suffix regex"));

/// Bucket name used when a top-level node has no usable display name.
pub const UNNAMED_CATEGORY: &str = "Unnamed";

/// Element counts keyed by top-level category name.
pub type CategoryCounts = BTreeMap<String, usize>;

/// Derives the bucket key from a raw display name.
pub fn category_key(name: &str) -> String {
    let stripped = BRACKET_SUFFIX_RE.replace(name, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        UNNAMED_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Counts leaf nodes in the subtree rooted at `node`, including `node` itself
/// when it has no children.
///
/// Walks with an explicit stack; a node reachable twice is only visited once.
pub fn count_leaves<Q: SceneQuery + ?Sized>(query: &Q, node: NodeId) -> usize {
    let mut visited = HashSet::new();
    let mut pending = vec![node];
    let mut leaves = 0;
    while let Some(current) = pending.pop() {
        // Why: a host can expose one instanced node under several parents;
        // the element behind it is still one leaf.
        if !visited.insert(current) {
            continue;
        }
        if query.child_count(current) == 0 {
            leaves += 1;
            continue;
        }
        query.enumerate_children(current, &mut |child| pending.push(child));
    }
    leaves
}

/// Aggregates leaf counts per top-level category.
///
/// # Errors
/// - `AggregationUnavailable` when the scene exposes no root.
pub fn aggregate_categories<Q: SceneQuery + ?Sized>(
    query: &Q,
) -> Result<CategoryCounts, SceneError> {
    let Some(root) = query.root_id() else {
        warn!("event=category_aggregate module=service status=skipped reason=no_instance_tree");
        return Err(SceneError::AggregationUnavailable);
    };

    let mut top_level = Vec::with_capacity(query.child_count(root));
    query.enumerate_children(root, &mut |child| top_level.push(child));

    let mut counts = CategoryCounts::new();
    for child in top_level {
        let key = query
            .node_name(child)
            .map(|name| category_key(&name))
            .unwrap_or_else(|| UNNAMED_CATEGORY.to_string());
        *counts.entry(key).or_insert(0) += count_leaves(query, child);
    }

    info!(
        "event=category_aggregate module=service status=ok categories={} elements={}",
        counts.len(),
        counts.values().sum::<usize>()
    );
    Ok(counts)
}
