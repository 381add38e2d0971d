//! Port traits decoupling the controller from the host page, the overlay
//! and the relay channel.

mod clock;
mod locator;
mod mutation;
mod overlay;
mod relay;
mod surface;

pub use clock::ClockPort;
pub use locator::SurfaceLocatorPort;
pub use mutation::StructuralChangeFeedPort;
pub use overlay::OverlayPort;
pub use relay::{EnhanceRelayPort, RelayError, RelayReply};
pub use surface::{ChangeSink, InputSurfacePort};
