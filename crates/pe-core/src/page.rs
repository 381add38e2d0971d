//! Host-page snapshot model.
//!
//! The embedding page owns the real structure; the controller only ever sees
//! immutable snapshots of it. A snapshot is a plain node tree carrying the
//! attributes the locator heuristics need: editable kind, accessibility role,
//! semantic markers, rendered size and the hidden flag.

use serde::{Deserialize, Serialize};

/// Stable identity of a page node. Survives re-renders as long as the host
/// page keeps the element alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// What a node is, as far as text entry is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Structural element with no editable text of its own.
    Container,
    /// Single-line or multi-line plain text entry field.
    PlainField,
    /// Rich editable region (contenteditable-style).
    RichRegion,
}

/// Accessible role exposed by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Textbox,
    Other,
}

/// One node of a page snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub role: Option<NodeRole>,
    /// Accessibility label, if the host page set one.
    pub aria_label: Option<String>,
    /// Form-style name attribute.
    pub name: Option<String>,
    /// Set on the host page's composer wrapper element.
    pub composer_marker: bool,
    /// Rendered size in device pixels.
    pub width: u32,
    pub height: u32,
    pub hidden: bool,
    pub children: Vec<PageNode>,
}

impl PageNode {
    /// A bare container node, useful as a building block.
    pub fn container(id: NodeId) -> Self {
        Self {
            id,
            kind: NodeKind::Container,
            role: None,
            aria_label: None,
            name: None,
            composer_marker: false,
            width: 0,
            height: 0,
            hidden: false,
            children: Vec::new(),
        }
    }

    /// Whether this node on its own renders to something the user can see.
    /// Ancestor visibility is the locator's concern, not the node's.
    pub fn has_rendered_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.kind, NodeKind::PlainField | NodeKind::RichRegion)
    }
}
