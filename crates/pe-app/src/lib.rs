//! # pe-app
//!
//! The enhancement lifecycle controller. One event loop owns everything
//! mutable — the bound surface, the cache slot, the UI state, the
//! suppression flag — and every external happening (user edits, page
//! mutations, timer elapses, clicks, relay completions) arrives as an event
//! on its channel. Nothing in this crate touches a concrete page or wire;
//! it works purely against the `pe-core` ports.

pub mod client;
pub mod controller;
pub mod debounce;
pub mod event;

pub use client::RetryingClient;
pub use controller::{ControllerHandle, EnhancerController};
pub use event::ControllerEvent;
