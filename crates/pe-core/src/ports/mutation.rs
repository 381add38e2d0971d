//! Structural-change subscription port.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::surface::StructuralChange;

/// Push feed of host-page structure mutations. Each notification is a hint
/// to re-run the locator; the feed carries no payload beyond "something
/// changed".
pub trait StructuralChangeFeedPort: Send + Sync {
    fn subscribe(&self, sink: mpsc::UnboundedSender<StructuralChange>) -> Result<()>;
}
