//! Overlay UI state machine.
//!
//! Defines a pure state transition function for the enhancement overlay.
//! The controller feeds it events and executes the returned actions; the
//! machine itself never touches the page or the network.

/// Panel copy shown while a request is in flight.
pub const BUSY_MESSAGE: &str = "Enhancing your prompt…";

/// Suffix appended to a suggestion before it is shown in the panel.
const PANEL_SUFFIX: &str = "\n\n(click to replace prompt)";

/// Panel text for a ready suggestion.
pub fn panel_text(enhanced: &str) -> String {
    format!("{enhanced}{PANEL_SUFFIX}")
}

/// Overlay icon rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconMode {
    /// Nothing to offer; icon sits dimmed.
    Dim,
    /// Request in flight; icon pulses.
    Busy,
    /// Suggestion available.
    Highlight,
    /// Failure needs attention.
    Attention,
}

/// Overlay lifecycle state. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Debouncing,
    Loading,
    Ready { enhanced: String },
    Error { message: String },
}

/// Events that drive the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Raw change notification from the bound surface.
    RawChange,
    /// Settled text was empty or below the minimum length.
    SettledTooShort,
    /// Settled text hit the cache slot.
    SettledCached { enhanced: String },
    /// Settled text is valid and uncached; a request is being dispatched.
    SettledNew,
    EnhanceSucceeded { enhanced: String },
    EnhanceFailed { message: String },
    IconClicked,
    PanelClicked,
    /// The controller bound a different surface (or lost the current one).
    SurfaceRebound,
}

/// Side-effects produced by state transitions. The controller executes them
/// against the overlay port; `ApplyEnhancement` additionally arms the
/// suppression flag and writes the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SetIcon(IconMode),
    ShowUnderline,
    ClearUnderline,
    ShowPanel(String),
    HidePanel,
    ApplyEnhancement { text: String },
}

/// Pure overlay state machine.
pub struct UiStateMachine;

impl UiStateMachine {
    pub fn transition(state: UiState, event: UiEvent) -> (UiState, Vec<UiAction>) {
        use UiAction::*;
        use UiState::*;

        match (state, event) {
            // Any user edit restarts the quiet period and tears down
            // whatever the previous cycle left on screen.
            (Idle | Debouncing, UiEvent::RawChange) => (Debouncing, Vec::new()),
            (Loading, UiEvent::RawChange) => (Debouncing, vec![SetIcon(IconMode::Dim)]),
            (Ready { .. }, UiEvent::RawChange) => (
                Debouncing,
                vec![ClearUnderline, HidePanel, SetIcon(IconMode::Dim)],
            ),
            (Error { .. }, UiEvent::RawChange) => {
                (Debouncing, vec![HidePanel, SetIcon(IconMode::Dim)])
            }

            (Debouncing, UiEvent::SettledTooShort) => (
                Idle,
                vec![ClearUnderline, HidePanel, SetIcon(IconMode::Dim)],
            ),
            (Debouncing, UiEvent::SettledCached { enhanced }) => {
                let actions = vec![
                    SetIcon(IconMode::Highlight),
                    ShowUnderline,
                    ShowPanel(panel_text(&enhanced)),
                ];
                (Ready { enhanced }, actions)
            }
            (Debouncing, UiEvent::SettledNew) => (Loading, vec![SetIcon(IconMode::Busy)]),

            (Loading, UiEvent::EnhanceSucceeded { enhanced }) => {
                let actions = vec![
                    SetIcon(IconMode::Highlight),
                    ShowUnderline,
                    ShowPanel(panel_text(&enhanced)),
                ];
                (Ready { enhanced }, actions)
            }
            (Loading, UiEvent::EnhanceFailed { message }) => {
                let actions = vec![SetIcon(IconMode::Attention), ShowPanel(message.clone())];
                (Error { message }, actions)
            }

            // Clicks while busy are acknowledged, not queued.
            (Loading, UiEvent::IconClicked) => {
                (Loading, vec![ShowPanel(BUSY_MESSAGE.to_string())])
            }
            (Ready { enhanced }, UiEvent::IconClicked) => {
                let actions = vec![
                    SetIcon(IconMode::Highlight),
                    ShowUnderline,
                    ShowPanel(panel_text(&enhanced)),
                ];
                (Ready { enhanced }, actions)
            }
            (Error { message }, UiEvent::IconClicked) => {
                let actions = vec![ShowPanel(message.clone())];
                (Error { message }, actions)
            }

            (Ready { enhanced }, UiEvent::PanelClicked) => (
                Idle,
                vec![
                    ApplyEnhancement { text: enhanced },
                    HidePanel,
                    ClearUnderline,
                    SetIcon(IconMode::Dim),
                ],
            ),

            (_, UiEvent::SurfaceRebound) => (
                Idle,
                vec![ClearUnderline, HidePanel, SetIcon(IconMode::Dim)],
            ),

            (state, _event) => (state, Vec::new()),
        }
    }
}
