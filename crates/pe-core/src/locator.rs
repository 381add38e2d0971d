//! Input-surface location heuristics.
//!
//! Applies prioritized rules over a page snapshot and returns the first
//! match in document order:
//!
//! 1. a rich editable region under the host page's composer marker;
//! 2. any visible editable element exposing an accessible textbox role;
//! 3. any visible rich editable region;
//! 4. a visible plain text-entry field as last resort.
//!
//! "Visible" means non-zero rendered size with no hidden ancestor.

use crate::page::{NodeRole, PageNode};
use crate::surface::{SurfaceKind, SurfaceRef};

/// Priority tiers, lowest value wins.
const TIER_COMPOSER: usize = 0;
const TIER_TEXTBOX_ROLE: usize = 1;
const TIER_RICH_REGION: usize = 2;
const TIER_PLAIN_FIELD: usize = 3;
const TIERS: usize = 4;

/// Locate the candidate input surface inside `root`, if any.
pub fn locate(root: &PageNode) -> Option<SurfaceRef> {
    let mut best: [Option<SurfaceRef>; TIERS] = [None; TIERS];
    walk(root, false, false, &mut best);
    best.into_iter().flatten().next()
}

fn walk(
    node: &PageNode,
    ancestor_hidden: bool,
    under_composer: bool,
    best: &mut [Option<SurfaceRef>; TIERS],
) {
    let hidden = ancestor_hidden || node.hidden;
    let in_composer = under_composer || node.composer_marker;

    if !hidden && node.has_rendered_size() {
        if let Some(kind) = SurfaceKind::from_node_kind(node.kind) {
            let surface = SurfaceRef { id: node.id, kind };
            let tier = match kind {
                SurfaceKind::RichRegion if in_composer => TIER_COMPOSER,
                _ if node.role == Some(NodeRole::Textbox) => TIER_TEXTBOX_ROLE,
                SurfaceKind::RichRegion => TIER_RICH_REGION,
                SurfaceKind::PlainField => TIER_PLAIN_FIELD,
            };
            if best[tier].is_none() {
                best[tier] = Some(surface);
            }
        }
    }

    for child in &node.children {
        walk(child, hidden, in_composer, best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{NodeId, NodeKind, NodeRole, PageNode};

    fn editable(id: u64, kind: NodeKind) -> PageNode {
        let mut node = PageNode::container(NodeId(id));
        node.kind = kind;
        node.width = 600;
        node.height = 40;
        node
    }

    fn page(children: Vec<PageNode>) -> PageNode {
        let mut root = PageNode::container(NodeId(0));
        root.width = 1280;
        root.height = 720;
        root.children = children;
        root
    }

    #[test]
    fn empty_page_locates_nothing() {
        assert_eq!(locate(&page(vec![])), None);
    }

    #[test]
    fn composer_region_beats_everything() {
        let mut composer = PageNode::container(NodeId(1));
        composer.composer_marker = true;
        composer.width = 600;
        composer.height = 80;
        composer.children = vec![editable(2, NodeKind::RichRegion)];

        let mut textarea = editable(3, NodeKind::PlainField);
        textarea.role = Some(NodeRole::Textbox);

        // Plain field comes first in document order; the composer still wins.
        let found = locate(&page(vec![textarea, composer])).unwrap();
        assert_eq!(found.id, NodeId(2));
        assert_eq!(found.kind, SurfaceKind::RichRegion);
    }

    #[test]
    fn textbox_role_beats_bare_rich_region() {
        let rich = editable(1, NodeKind::RichRegion);
        let mut labeled = editable(2, NodeKind::PlainField);
        labeled.role = Some(NodeRole::Textbox);

        let found = locate(&page(vec![rich, labeled])).unwrap();
        assert_eq!(found.id, NodeId(2));
    }

    #[test]
    fn plain_field_is_the_last_resort() {
        let found = locate(&page(vec![editable(5, NodeKind::PlainField)])).unwrap();
        assert_eq!(found.id, NodeId(5));
        assert_eq!(found.kind, SurfaceKind::PlainField);
    }

    #[test]
    fn hidden_ancestor_disqualifies() {
        let mut wrapper = PageNode::container(NodeId(1));
        wrapper.hidden = true;
        wrapper.width = 600;
        wrapper.height = 80;
        wrapper.children = vec![editable(2, NodeKind::RichRegion)];

        assert_eq!(locate(&page(vec![wrapper])), None);
    }

    #[test]
    fn zero_size_disqualifies() {
        let mut collapsed = editable(2, NodeKind::RichRegion);
        collapsed.width = 0;
        assert_eq!(locate(&page(vec![collapsed])), None);
    }

    #[test]
    fn first_match_in_document_order_wins_within_a_tier() {
        let first = editable(1, NodeKind::RichRegion);
        let second = editable(2, NodeKind::RichRegion);
        let found = locate(&page(vec![first, second])).unwrap();
        assert_eq!(found.id, NodeId(1));
    }
}
