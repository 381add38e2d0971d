//! In-memory host page.
//!
//! `PageDocument` plays the part of the embedding page: a mutable node tree
//! that external code (the embedder, tests) edits at will. The document
//! owns every node; adapters hold ids, never nodes. Edits notify two kinds
//! of subscribers: per-node change listeners (text edits) and structural
//! listeners (insert/remove/visibility), mirroring how a real page pushes
//! input events and mutation records separately.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::debug;

use pe_core::page::{NodeId, NodeKind, NodeRole, PageNode};
use pe_core::ports::StructuralChangeFeedPort;
use pe_core::surface::{StructuralChange, SurfaceChange};

/// Description of a node to insert.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub role: Option<NodeRole>,
    pub aria_label: Option<String>,
    pub name: Option<String>,
    pub composer_marker: bool,
    pub width: u32,
    pub height: u32,
    pub hidden: bool,
    pub text: String,
}

impl NodeSpec {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            role: None,
            aria_label: None,
            name: None,
            composer_marker: false,
            width: 0,
            height: 0,
            hidden: false,
            text: String::new(),
        }
    }

    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    pub fn plain_field() -> Self {
        let mut spec = Self::new(NodeKind::PlainField);
        spec.width = 600;
        spec.height = 40;
        spec
    }

    pub fn rich_region() -> Self {
        let mut spec = Self::new(NodeKind::RichRegion);
        spec.width = 600;
        spec.height = 80;
        spec
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn composer(mut self) -> Self {
        self.composer_marker = true;
        self
    }

    pub fn sized(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

struct NodeRecord {
    kind: NodeKind,
    role: Option<NodeRole>,
    aria_label: Option<String>,
    name: Option<String>,
    composer_marker: bool,
    width: u32,
    height: u32,
    hidden: bool,
    text: String,
    children: Vec<NodeId>,
}

struct ChangeListener {
    token: u64,
    node: NodeId,
    sink: mpsc::UnboundedSender<SurfaceChange>,
}

struct DocumentState {
    next_id: u64,
    next_token: u64,
    root: NodeId,
    nodes: HashMap<NodeId, NodeRecord>,
    change_listeners: Vec<ChangeListener>,
    mutation_listeners: Vec<mpsc::UnboundedSender<StructuralChange>>,
}

/// Cheaply clonable handle to the shared page.
#[derive(Clone)]
pub struct PageDocument {
    inner: Arc<Mutex<DocumentState>>,
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDocument {
    /// An empty page: a full-viewport root container and nothing else.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            NodeRecord {
                kind: NodeKind::Container,
                role: None,
                aria_label: None,
                name: None,
                composer_marker: false,
                width: 1280,
                height: 720,
                hidden: false,
                text: String::new(),
                children: Vec::new(),
            },
        );
        Self {
            inner: Arc::new(Mutex::new(DocumentState {
                next_id: 1,
                next_token: 1,
                root,
                nodes,
                change_listeners: Vec::new(),
                mutation_listeners: Vec::new(),
            })),
        }
    }

    pub fn root(&self) -> NodeId {
        self.lock().root
    }

    /// Insert a node under `parent` and announce the structural change.
    pub fn insert(&self, parent: NodeId, spec: NodeSpec) -> Result<NodeId> {
        let mut state = self.lock();
        if !state.nodes.contains_key(&parent) {
            return Err(anyhow!("parent {parent} is not attached"));
        }
        let id = NodeId(state.next_id);
        state.next_id += 1;
        state.nodes.insert(
            id,
            NodeRecord {
                kind: spec.kind,
                role: spec.role,
                aria_label: spec.aria_label,
                name: spec.name,
                composer_marker: spec.composer_marker,
                width: spec.width,
                height: spec.height,
                hidden: spec.hidden,
                text: spec.text,
                children: Vec::new(),
            },
        );
        state
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| anyhow!("parent {parent} is not attached"))?
            .children
            .push(id);
        Self::notify_mutation(&mut state);
        Ok(id)
    }

    /// Detach a node (and its subtree) from the page.
    pub fn remove(&self, id: NodeId) -> Result<()> {
        let mut state = self.lock();
        if id == state.root {
            return Err(anyhow!("cannot remove the page root"));
        }
        if !state.nodes.contains_key(&id) {
            return Err(anyhow!("node {id} is not attached"));
        }
        for record in state.nodes.values_mut() {
            record.children.retain(|child| *child != id);
        }
        Self::remove_subtree(&mut state, id);
        Self::notify_mutation(&mut state);
        Ok(())
    }

    pub fn set_hidden(&self, id: NodeId, hidden: bool) -> Result<()> {
        let mut state = self.lock();
        state
            .nodes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("node {id} is not attached"))?
            .hidden = hidden;
        Self::notify_mutation(&mut state);
        Ok(())
    }

    /// Whether the node is still part of the page.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.lock().nodes.contains_key(&id)
    }

    pub fn text_of(&self, id: NodeId) -> Result<String> {
        let state = self.lock();
        state
            .nodes
            .get(&id)
            .map(|record| record.text.clone())
            .ok_or_else(|| anyhow!("node {id} is not attached"))
    }

    /// Replace a node's text and notify its change listeners. Covers both
    /// user typing and programmatic writes; the page cannot tell them
    /// apart, which is exactly why the controller needs its suppression
    /// flag.
    pub fn set_text(&self, id: NodeId, text: impl Into<String>) -> Result<()> {
        let mut state = self.lock();
        let record = state
            .nodes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("node {id} is not attached"))?;
        if !matches!(record.kind, NodeKind::PlainField | NodeKind::RichRegion) {
            return Err(anyhow!("node {id} is not editable"));
        }
        record.text = text.into();
        Self::notify_change(&mut state, id);
        Ok(())
    }

    /// Immutable snapshot of the current page structure.
    pub fn snapshot(&self) -> PageNode {
        let state = self.lock();
        Self::snapshot_node(&state, state.root)
            .unwrap_or_else(|| PageNode::container(state.root))
    }

    pub(crate) fn subscribe_changes(
        &self,
        node: NodeId,
        sink: mpsc::UnboundedSender<SurfaceChange>,
    ) -> u64 {
        let mut state = self.lock();
        let token = state.next_token;
        state.next_token += 1;
        state.change_listeners.push(ChangeListener { token, node, sink });
        token
    }

    pub(crate) fn unsubscribe_changes(&self, token: u64) {
        let mut state = self.lock();
        state.change_listeners.retain(|l| l.token != token);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DocumentState> {
        // A panic while holding the lock is a test-harness bug; the page
        // itself never panics mid-edit.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove_subtree(state: &mut DocumentState, id: NodeId) {
        if let Some(record) = state.nodes.remove(&id) {
            for child in record.children {
                Self::remove_subtree(state, child);
            }
        }
    }

    fn snapshot_node(state: &DocumentState, id: NodeId) -> Option<PageNode> {
        let record = state.nodes.get(&id)?;
        Some(PageNode {
            id,
            kind: record.kind,
            role: record.role,
            aria_label: record.aria_label.clone(),
            name: record.name.clone(),
            composer_marker: record.composer_marker,
            width: record.width,
            height: record.height,
            hidden: record.hidden,
            children: record
                .children
                .iter()
                .filter_map(|child| Self::snapshot_node(state, *child))
                .collect(),
        })
    }

    fn notify_change(state: &mut DocumentState, node: NodeId) {
        state
            .change_listeners
            .retain(|l| l.node != node || l.sink.send(SurfaceChange { surface: node }).is_ok());
    }

    fn notify_mutation(state: &mut DocumentState) {
        state
            .mutation_listeners
            .retain(|sink| sink.send(StructuralChange).is_ok());
        debug!(listeners = state.mutation_listeners.len(), "page structure mutated");
    }
}

impl StructuralChangeFeedPort for PageDocument {
    fn subscribe(&self, sink: mpsc::UnboundedSender<StructuralChange>) -> Result<()> {
        self.lock().mutation_listeners.push(sink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_snapshot() {
        let doc = PageDocument::new();
        let field = doc.insert(doc.root(), NodeSpec::plain_field()).unwrap();

        let snapshot = doc.snapshot();
        assert_eq!(snapshot.children.len(), 1);
        assert_eq!(snapshot.children[0].id, field);
        assert_eq!(snapshot.children[0].kind, NodeKind::PlainField);
    }

    #[test]
    fn remove_detaches_the_subtree() {
        let doc = PageDocument::new();
        let wrapper = doc.insert(doc.root(), NodeSpec::container()).unwrap();
        let field = doc.insert(wrapper, NodeSpec::plain_field()).unwrap();

        doc.remove(wrapper).unwrap();
        assert!(!doc.is_attached(wrapper));
        assert!(!doc.is_attached(field));
        assert!(doc.snapshot().children.is_empty());
    }

    #[test]
    fn set_text_notifies_listeners_for_that_node_only() {
        let doc = PageDocument::new();
        let field = doc.insert(doc.root(), NodeSpec::plain_field()).unwrap();
        let other = doc.insert(doc.root(), NodeSpec::plain_field()).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        doc.subscribe_changes(field, tx);

        doc.set_text(other, "elsewhere").unwrap();
        doc.set_text(field, "hello").unwrap();

        assert_eq!(rx.try_recv().unwrap(), SurfaceChange { surface: field });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn structural_subscribers_hear_inserts_and_removals() {
        let doc = PageDocument::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        doc.subscribe(tx).unwrap();

        let field = doc.insert(doc.root(), NodeSpec::plain_field()).unwrap();
        doc.remove(field).unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn text_requires_an_editable_node() {
        let doc = PageDocument::new();
        let wrapper = doc.insert(doc.root(), NodeSpec::container()).unwrap();
        assert!(doc.set_text(wrapper, "nope").is_err());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let doc = PageDocument::new();
        let field = doc.insert(doc.root(), NodeSpec::plain_field()).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = doc.subscribe_changes(field, tx);
        doc.unsubscribe_changes(token);

        doc.set_text(field, "hello").unwrap();
        assert!(rx.try_recv().is_err());
    }
}
