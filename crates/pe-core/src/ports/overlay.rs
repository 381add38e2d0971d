//! Overlay rendering port.

use crate::ui::IconMode;

/// Visual affordances the controller drives: the floating icon, the wavy
/// underline decoration and the suggestion panel. Rendering is best-effort;
/// a failed paint never aborts the lifecycle, so these operations are
/// infallible by contract.
pub trait OverlayPort: Send + Sync {
    fn set_icon(&self, mode: IconMode);

    fn show_underline(&self);
    fn clear_underline(&self);

    fn show_panel(&self, text: &str);
    fn hide_panel(&self);
}
