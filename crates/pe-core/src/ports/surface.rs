//! Input-surface port - uniform access to an externally-owned editable
//! element.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::page::NodeId;
use crate::surface::{SurfaceChange, SurfaceKind};

/// Channel end an adapter pushes raw change notifications into.
pub type ChangeSink = mpsc::UnboundedSender<SurfaceChange>;

/// Uniform get/set/observe operations over a bound input surface.
///
/// The surface is owned by the host page; an adapter holds a reference plus
/// a subscription, nothing more. Its lifecycle ends the instant the page
/// detaches the element, which callers detect through `is_attached`, never
/// through a destruction call.
pub trait InputSurfacePort: Send + Sync {
    fn id(&self) -> NodeId;

    fn kind(&self) -> SurfaceKind;

    /// Current text of the surface.
    fn text(&self) -> Result<String>;

    /// Programmatically replace the surface text.
    ///
    /// Must emit a synthetic change notification so downstream listeners
    /// observe the update exactly like a user edit.
    fn set_text(&self, value: &str) -> Result<()>;

    /// Whether the underlying element is still part of the page.
    fn is_attached(&self) -> bool;

    /// Subscribe to raw change notifications for this surface. Dropping the
    /// adapter tears the subscription down.
    fn observe(&self, sink: ChangeSink) -> Result<()>;
}
