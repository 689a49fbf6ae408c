//! MAVLink integration for the engine controller
//!
//! Inbound COMMAND_LONG handling, outbound ICE status messages and the
//! queued STATUSTEXT notifications. Framing and transport belong to the
//! host's MAVLink router.

pub mod handlers;
pub mod status_notifier;
pub mod telemetry;

pub use status_notifier::{StatusMessage, StatusNotifier};
pub use telemetry::IceCommandLong;
