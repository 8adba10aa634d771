//! Driver presence tracking with proximity-based drowsiness alert fan-out.
//!
//! Drivers connect over WebSocket, register an id, stream positions and raise
//! alerts; every other registered driver within the configured radius of the
//! alerting driver receives a `nearby_alert` event.

pub mod adapters;
pub mod application;
pub mod common;
pub mod config;
pub mod domains;

pub use config::Config;

// Re-export common types
pub use common::*;

// Re-export domain types
pub use domains::*;
