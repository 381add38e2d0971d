//! Locator port - finds and binds the candidate input surface.

use std::sync::Arc;

use anyhow::Result;

use crate::surface::SurfaceRef;

use super::InputSurfacePort;

pub trait SurfaceLocatorPort: Send + Sync {
    /// Apply the location heuristics to the current page structure.
    /// `None` is a normal outcome while the page is still assembling itself.
    fn locate(&self) -> Result<Option<SurfaceRef>>;

    /// Build an adapter bound to a located surface.
    fn bind(&self, surface: &SurfaceRef) -> Result<Arc<dyn InputSurfacePort>>;
}
