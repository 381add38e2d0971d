//! In-memory overlay adapter.

use std::sync::Mutex;

use pe_core::ports::OverlayPort;
use pe_core::ui::IconMode;

#[derive(Debug, Clone, PartialEq, Eq)]
struct OverlayState {
    icon: IconMode,
    underline: bool,
    panel: Option<String>,
}

/// Records the overlay affordances the controller drives. Stands in for a
/// real rendered overlay; tests and embedders read the recorded state back.
pub struct InMemoryOverlay {
    state: Mutex<OverlayState>,
}

impl Default for InMemoryOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOverlay {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OverlayState {
                icon: IconMode::Dim,
                underline: false,
                panel: None,
            }),
        }
    }

    pub fn icon(&self) -> IconMode {
        self.lock().icon
    }

    pub fn underline_visible(&self) -> bool {
        self.lock().underline
    }

    /// Panel text, if the panel is currently shown.
    pub fn panel_text(&self) -> Option<String> {
        self.lock().panel.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OverlayState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl OverlayPort for InMemoryOverlay {
    fn set_icon(&self, mode: IconMode) {
        self.lock().icon = mode;
    }

    fn show_underline(&self) {
        self.lock().underline = true;
    }

    fn clear_underline(&self) {
        self.lock().underline = false;
    }

    fn show_panel(&self, text: &str) {
        self.lock().panel = Some(text.to_string());
    }

    fn hide_panel(&self) {
        self.lock().panel = None;
    }
}
