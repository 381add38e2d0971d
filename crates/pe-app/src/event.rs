//! Controller events.

use pe_core::page::NodeId;
use pe_core::{EnhanceError, EnhancementResult};

/// Everything that can wake the controller loop. External collaborators
/// (surface adapters, the mutation feed, the overlay click handlers, the
/// relay completion tasks) only ever talk to the controller through these.
#[derive(Debug)]
pub enum ControllerEvent {
    /// Raw change notification from a surface adapter.
    SurfaceChanged { surface: NodeId },
    /// The debounce timer for `generation` ran out.
    QuietPeriodElapsed { generation: u64 },
    /// The host page structure mutated; re-run the locator.
    PageMutated,
    IconClicked,
    PanelClicked,
    /// The retrying client finished the request dispatched at `generation`.
    EnhancementFinished {
        generation: u64,
        outcome: Result<EnhancementResult, EnhanceError>,
    },
    /// Stop the run loop.
    Shutdown,
}
