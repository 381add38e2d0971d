//! Overlay UI state machine.

mod state_machine;

pub use state_machine::{
    panel_text, IconMode, UiAction, UiEvent, UiState, UiStateMachine, BUSY_MESSAGE,
};
