//! # pe-relay
//!
//! The asynchronous request/response channel that ferries an enhancement
//! request from the controller to a network-capable context. The controller
//! only ever sees the `EnhanceRelayPort` contract; this crate provides the
//! HTTP implementation speaking the `POST /enhance` wire protocol.

pub mod http;

pub use http::HttpEnhanceRelay;
