//! Locator adapter over the page document.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use pe_core::locator;
use pe_core::ports::{InputSurfacePort, SurfaceLocatorPort};
use pe_core::surface::SurfaceRef;

use crate::page::PageDocument;
use crate::surface::PageSurfaceAdapter;

/// Runs the core location heuristics against a live document snapshot.
pub struct DocumentLocator {
    doc: PageDocument,
}

impl DocumentLocator {
    pub fn new(doc: PageDocument) -> Self {
        Self { doc }
    }
}

impl SurfaceLocatorPort for DocumentLocator {
    fn locate(&self) -> Result<Option<SurfaceRef>> {
        let snapshot = self.doc.snapshot();
        let found = locator::locate(&snapshot);
        if let Some(surface) = &found {
            debug!(surface = %surface.id, kind = ?surface.kind, "located input surface");
        }
        Ok(found)
    }

    fn bind(&self, surface: &SurfaceRef) -> Result<Arc<dyn InputSurfacePort>> {
        Ok(Arc::new(PageSurfaceAdapter::new(self.doc.clone(), *surface)))
    }
}
