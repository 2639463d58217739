//! Scene-graph capability contracts.
//!
//! # Responsibility
//! - Define the read-only traversal capability (`SceneQuery`) and the
//!   side-effecting mutation capability (`SceneMutator`) the hosting viewer
//!   provides.
//! - Define the scene-level error taxonomy.
//!
//! # Invariants
//! - The engine is the sole writer of a `SceneMutator` while attached.
//! - Capabilities are passed explicitly; there is no ambient viewer handle.

use crate::model::schedule::ElementId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod readiness;

/// Scene node identifier. Leaf node ids coincide with element ids.
pub type NodeId = ElementId;

/// Read-only traversal primitives over the hosted model hierarchy.
///
/// The hierarchy is expected to be a tree. Hosts may still report one node
/// under several parents (instanced geometry); walkers visit such a node
/// once per walk.
pub trait SceneQuery {
    /// Root of the instance tree, or `None` when no tree is available.
    fn root_id(&self) -> Option<NodeId>;
    /// Calls `visit` once per immediate child of `node`, in child order.
    fn enumerate_children(&self, node: NodeId, visit: &mut dyn FnMut(NodeId));
    fn child_count(&self, node: NodeId) -> usize;
    fn node_name(&self, node: NodeId) -> Option<String>;
}

/// Side-effecting viewer calls issued by the evaluator and reset path.
pub trait SceneMutator {
    fn hide_all(&mut self);
    fn show_all(&mut self);
    fn show(&mut self, ids: &[ElementId]);
    /// Shows exactly `ids` and hides everything else.
    fn isolate(&mut self, ids: &[ElementId]);
    fn select(&mut self, ids: &[ElementId]);
    /// Applies `color` to `id`, or removes its overlay when `None`.
    fn set_highlight(&mut self, id: ElementId, color: Option<HighlightColor>);
    fn clear_highlights(&mut self);
}

/// RGBA overlay color used for in-progress theming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HighlightColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HighlightColor {
    /// Default in-progress color (dark orange, opaque).
    pub const IN_PROGRESS: Self = Self::rgb(0xFF, 0x8C, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn parse_hex(value: &str) -> Result<Self, ColorParseError> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(ColorParseError(trimmed.to_string()));
        }

        let channel = |index: usize| {
            u8::from_str_radix(&digits[index..index + 2], 16)
                .map_err(|_| ColorParseError(trimmed.to_string()))
        };
        let a = if digits.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }

    /// Formats as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for HighlightColor {
    fn default() -> Self {
        Self::IN_PROGRESS
    }
}

impl TryFrom<String> for HighlightColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<HighlightColor> for String {
    fn from(value: HighlightColor) -> Self {
        value.to_hex()
    }
}

/// Rejected color literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "highlight color must be #RRGGBB or #RRGGBBAA, got `{}`",
            self.0
        )
    }
}

impl Error for ColorParseError {}

/// Scene availability and structure errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No scene is attached yet; the operation was aborted without changes.
    NotReady,
    /// The scene became ready without a usable instance tree.
    AggregationUnavailable,
    /// The model load finished with a failure outcome.
    LoadFailed(String),
    /// A node referenced as parent does not exist.
    UnknownNode(NodeId),
    /// A node id was declared twice while building a scene.
    DuplicateNode(NodeId),
}

impl Display for SceneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "scene is not ready"),
            Self::AggregationUnavailable => {
                write!(f, "scene has no instance tree to aggregate")
            }
            Self::LoadFailed(reason) => write!(f, "model load failed: {reason}"),
            Self::UnknownNode(id) => write!(f, "scene node not found: {id}"),
            Self::DuplicateNode(id) => write!(f, "scene node declared twice: {id}"),
        }
    }
}

impl Error for SceneError {}
