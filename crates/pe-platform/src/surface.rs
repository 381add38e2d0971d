//! Surface adapter over a page node.

use std::sync::Mutex;

use anyhow::Result;

use pe_core::page::NodeId;
use pe_core::ports::{ChangeSink, InputSurfacePort};
use pe_core::surface::{SurfaceKind, SurfaceRef};

use crate::page::PageDocument;

/// Uniform text access over one editable page node. Holds only the node id
/// and a document handle; the page stays the owner of the element.
pub struct PageSurfaceAdapter {
    doc: PageDocument,
    surface: SurfaceRef,
    subscription: Mutex<Option<u64>>,
}

impl PageSurfaceAdapter {
    pub fn new(doc: PageDocument, surface: SurfaceRef) -> Self {
        Self {
            doc,
            surface,
            subscription: Mutex::new(None),
        }
    }
}

impl InputSurfacePort for PageSurfaceAdapter {
    fn id(&self) -> NodeId {
        self.surface.id
    }

    fn kind(&self) -> SurfaceKind {
        self.surface.kind
    }

    fn text(&self) -> Result<String> {
        self.doc.text_of(self.surface.id)
    }

    fn set_text(&self, value: &str) -> Result<()> {
        // The document notifies listeners on every write, so the synthetic
        // change notification required of programmatic writes comes for
        // free here.
        self.doc.set_text(self.surface.id, value)
    }

    fn is_attached(&self) -> bool {
        self.doc.is_attached(self.surface.id)
    }

    fn observe(&self, sink: ChangeSink) -> Result<()> {
        let token = self.doc.subscribe_changes(self.surface.id, sink);
        let mut slot = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.replace(token) {
            self.doc.unsubscribe_changes(previous);
        }
        Ok(())
    }
}

impl Drop for PageSurfaceAdapter {
    fn drop(&mut self) {
        let token = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(token) = token {
            self.doc.unsubscribe_changes(token);
        }
    }
}
