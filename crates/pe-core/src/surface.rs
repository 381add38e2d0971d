//! Input-surface value objects.

use serde::{Deserialize, Serialize};

use crate::page::{NodeId, NodeKind};

/// Shape of a bound input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    PlainField,
    RichRegion,
}

impl SurfaceKind {
    pub fn from_node_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::PlainField => Some(Self::PlainField),
            NodeKind::RichRegion => Some(Self::RichRegion),
            NodeKind::Container => None,
        }
    }
}

/// Reference to a located input surface. Identity is the page node id; two
/// refs denote the same surface exactly when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceRef {
    pub id: NodeId,
    pub kind: SurfaceKind,
}

/// Raw change notification emitted by a surface adapter. Carries the surface
/// identity so a consumer can discard notifications from a surface it no
/// longer has bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceChange {
    pub surface: NodeId,
}

/// Structural mutation notification from the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralChange;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::NodeKind;

    #[test]
    fn surface_kind_maps_editable_node_kinds_only() {
        assert_eq!(
            SurfaceKind::from_node_kind(NodeKind::PlainField),
            Some(SurfaceKind::PlainField)
        );
        assert_eq!(
            SurfaceKind::from_node_kind(NodeKind::RichRegion),
            Some(SurfaceKind::RichRegion)
        );
        assert_eq!(SurfaceKind::from_node_kind(NodeKind::Container), None);
    }

    #[test]
    fn surface_identity_is_the_node_id() {
        let a = SurfaceRef {
            id: NodeId(7),
            kind: SurfaceKind::RichRegion,
        };
        let b = SurfaceRef {
            id: NodeId(7),
            kind: SurfaceKind::RichRegion,
        };
        assert_eq!(a, b);
    }
}
