//! In-memory scene graph.
//!
//! Implements both scene capabilities over a plain node map and records every
//! mutation call in order. Used by the CLI replay and by tests that assert
//! the exact mutation sequence.

use crate::model::schedule::ElementId;
use crate::scene::{HighlightColor, NodeId, SceneError, SceneMutator, SceneQuery};
use crate::service::selection::{PropertySource, RawProperty};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// One recorded mutation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCall {
    HideAll,
    ShowAll,
    Show(Vec<ElementId>),
    Isolate(Vec<ElementId>),
    Select(Vec<ElementId>),
    SetHighlight(ElementId, Option<HighlightColor>),
    ClearHighlights,
}

/// Declarative node tree used to build an `InMemoryScene` (e.g. from JSON).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNodeSpec {
    /// Explicit id; nodes without one get the next free id while the tree is walked.
    #[serde(default)]
    pub id: Option<NodeId>,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default)]
    pub children: Vec<SceneNodeSpec>,
}

#[derive(Debug, Clone, Default)]
struct SceneNode {
    name: String,
    children: Vec<NodeId>,
    properties: Vec<RawProperty>,
}

/// Map-backed scene with visibility, highlight and selection state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    root: Option<NodeId>,
    nodes: BTreeMap<NodeId, SceneNode>,
    visible: BTreeSet<ElementId>,
    highlights: BTreeMap<ElementId, HighlightColor>,
    selection: Vec<ElementId>,
    calls: Vec<SceneCall>,
}

impl InMemoryScene {
    /// Creates a scene with no instance tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scene holding only a root node. Every node starts visible.
    pub fn with_root(id: NodeId, name: impl Into<String>) -> Self {
        let mut scene = Self::new();
        scene.root = Some(id);
        scene.nodes.insert(
            id,
            SceneNode {
                name: name.into(),
                ..SceneNode::default()
            },
        );
        scene.visible.insert(id);
        scene
    }

    /// Builds a scene from a declarative tree.
    ///
    /// # Errors
    /// - `DuplicateNode` when two nodes declare the same explicit id.
    pub fn from_spec(spec: &SceneNodeSpec) -> Result<Self, SceneError> {
        let mut explicit = BTreeSet::new();
        collect_explicit_ids(spec, &mut explicit)?;

        let mut next_id = 1;
        let mut allocate = |declared: Option<NodeId>| match declared {
            Some(id) => id,
            None => {
                while explicit.contains(&next_id) {
                    next_id += 1;
                }
                let id = next_id;
                next_id += 1;
                id
            }
        };

        let root_id = allocate(spec.id);
        let mut scene = Self::with_root(root_id, spec.name.clone());
        scene.set_properties(root_id, spec.properties.clone())?;

        let mut pending = vec![(root_id, spec)];
        while let Some((parent, node)) = pending.pop() {
            let mut child_ids = Vec::with_capacity(node.children.len());
            for child in &node.children {
                let child_id = allocate(child.id);
                scene.insert_child(parent, child_id, child.name.clone())?;
                scene.set_properties(child_id, child.properties.clone())?;
                child_ids.push((child_id, child));
            }
            // Reverse so the stack pops children in declaration order.
            pending.extend(child_ids.into_iter().rev());
        }

        Ok(scene)
    }

    /// Adds one child node under `parent`.
    ///
    /// # Errors
    /// - `UnknownNode` when `parent` does not exist.
    /// - `DuplicateNode` when `id` is already used.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        id: NodeId,
        name: impl Into<String>,
    ) -> Result<(), SceneError> {
        if self.nodes.contains_key(&id) {
            return Err(SceneError::DuplicateNode(id));
        }
        self.nodes
            .get_mut(&parent)
            .ok_or(SceneError::UnknownNode(parent))?
            .children
            .push(id);
        self.nodes.insert(
            id,
            SceneNode {
                name: name.into(),
                ..SceneNode::default()
            },
        );
        self.visible.insert(id);
        Ok(())
    }

    /// Replaces the property bag of one node.
    pub fn set_properties(
        &mut self,
        id: NodeId,
        properties: Vec<RawProperty>,
    ) -> Result<(), SceneError> {
        self.nodes
            .get_mut(&id)
            .ok_or(SceneError::UnknownNode(id))?
            .properties = properties;
        Ok(())
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Ids of nodes with no children, in ascending order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn visible_ids(&self) -> Vec<ElementId> {
        self.visible.iter().copied().collect()
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.visible.contains(&id)
    }

    pub fn highlights(&self) -> &BTreeMap<ElementId, HighlightColor> {
        &self.highlights
    }

    pub fn highlighted_ids(&self) -> Vec<ElementId> {
        self.highlights.keys().copied().collect()
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Mutation calls in issue order.
    pub fn calls(&self) -> &[SceneCall] {
        &self.calls
    }

    /// Drains the recorded call log, keeping the resulting state.
    pub fn take_calls(&mut self) -> Vec<SceneCall> {
        std::mem::take(&mut self.calls)
    }
}

impl SceneQuery for InMemoryScene {
    fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    fn enumerate_children(&self, node: NodeId, visit: &mut dyn FnMut(NodeId)) {
        if let Some(node) = self.nodes.get(&node) {
            for child in &node.children {
                visit(*child);
            }
        }
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.nodes.get(&node).map_or(0, |node| node.children.len())
    }

    fn node_name(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node).map(|node| node.name.clone())
    }
}

impl SceneMutator for InMemoryScene {
    fn hide_all(&mut self) {
        self.calls.push(SceneCall::HideAll);
        self.visible.clear();
    }

    fn show_all(&mut self) {
        self.calls.push(SceneCall::ShowAll);
        self.visible = self.nodes.keys().copied().collect();
    }

    fn show(&mut self, ids: &[ElementId]) {
        self.calls.push(SceneCall::Show(ids.to_vec()));
        self.visible.extend(ids.iter().copied());
    }

    fn isolate(&mut self, ids: &[ElementId]) {
        self.calls.push(SceneCall::Isolate(ids.to_vec()));
        self.visible = ids.iter().copied().collect();
    }

    fn select(&mut self, ids: &[ElementId]) {
        self.calls.push(SceneCall::Select(ids.to_vec()));
        self.selection = ids.to_vec();
    }

    fn set_highlight(&mut self, id: ElementId, color: Option<HighlightColor>) {
        self.calls.push(SceneCall::SetHighlight(id, color));
        match color {
            Some(color) => {
                self.highlights.insert(id, color);
            }
            None => {
                self.highlights.remove(&id);
            }
        }
    }

    fn clear_highlights(&mut self) {
        self.calls.push(SceneCall::ClearHighlights);
        self.highlights.clear();
    }
}

impl PropertySource for InMemoryScene {
    fn properties(&self, id: ElementId) -> Option<Vec<RawProperty>> {
        self.nodes.get(&id).map(|node| node.properties.clone())
    }
}

fn collect_explicit_ids(
    spec: &SceneNodeSpec,
    seen: &mut BTreeSet<NodeId>,
) -> Result<(), SceneError> {
    let mut pending = vec![spec];
    while let Some(node) = pending.pop() {
        if let Some(id) = node.id {
            if !seen.insert(id) {
                return Err(SceneError::DuplicateNode(id));
            }
        }
        pending.extend(node.children.iter());
    }
    Ok(())
}
