//! Tool-provider registry.
//!
//! Viewer tools (selection, isolation) are registered explicitly by the host
//! at startup instead of self-registering against a global.

use crate::model::schedule::ElementId;
use crate::scene::SceneMutator;
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Stable id of the built-in selection tool.
pub const TOOL_SELECT: &str = "builtin.select";
/// Stable id of the built-in isolation tool.
pub const TOOL_ISOLATE: &str = "builtin.isolate";

/// Capability-provider contract for one viewer tool.
pub trait ToolProvider {
    fn tool_id(&self) -> &str;
    /// User-facing button label.
    fn label(&self) -> &str;
    fn activate(&self, scene: &mut dyn SceneMutator, ids: &[ElementId]);
}

/// Selects the given elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionTool;

impl ToolProvider for SelectionTool {
    fn tool_id(&self) -> &str {
        TOOL_SELECT
    }

    fn label(&self) -> &str {
        "Select elements"
    }

    fn activate(&self, scene: &mut dyn SceneMutator, ids: &[ElementId]) {
        scene.select(ids);
    }
}

/// Shows only the given elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolateTool;

impl ToolProvider for IsolateTool {
    fn tool_id(&self) -> &str {
        TOOL_ISOLATE
    }

    fn label(&self) -> &str {
        "Isolate elements"
    }

    fn activate(&self, scene: &mut dyn SceneMutator, ids: &[ElementId]) {
        scene.isolate(ids);
    }
}

/// Tool registration/activation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRegistryError {
    InvalidToolId(String),
    DuplicateToolId(String),
    ToolNotFound(String),
}

impl Display for ToolRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidToolId(value) => write!(f, "tool id is invalid: {value}"),
            Self::DuplicateToolId(value) => write!(f, "tool id already registered: {value}"),
            Self::ToolNotFound(value) => write!(f, "tool not found: {value}"),
        }
    }
}

impl Error for ToolRegistryError {}

/// In-process registry of viewer tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn ToolProvider>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in select and isolate tools.
    pub fn with_builtin_tools() -> Result<Self, ToolRegistryError> {
        let mut registry = Self::new();
        registry.register(Arc::new(SelectionTool))?;
        registry.register(Arc::new(IsolateTool))?;
        Ok(registry)
    }

    /// Registers one tool provider.
    pub fn register(&mut self, tool: Arc<dyn ToolProvider>) -> Result<(), ToolRegistryError> {
        let tool_id = tool.tool_id().trim().to_string();
        if !is_valid_tool_id(&tool_id) {
            return Err(ToolRegistryError::InvalidToolId(tool_id));
        }
        if self.tools.contains_key(tool_id.as_str()) {
            return Err(ToolRegistryError::DuplicateToolId(tool_id));
        }

        info!("event=tool_register module=extension status=ok tool_id={tool_id}");
        self.tools.insert(tool_id, tool);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns sorted tool ids.
    pub fn tool_ids(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn get(&self, tool_id: &str) -> Option<Arc<dyn ToolProvider>> {
        self.tools.get(tool_id.trim()).cloned()
    }

    /// Runs one tool against `scene`.
    pub fn activate(
        &self,
        tool_id: &str,
        scene: &mut dyn SceneMutator,
        ids: &[ElementId],
    ) -> Result<(), ToolRegistryError> {
        let tool = self
            .get(tool_id)
            .ok_or_else(|| ToolRegistryError::ToolNotFound(tool_id.trim().to_string()))?;
        tool.activate(scene, ids);
        Ok(())
    }
}

fn is_valid_tool_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}
