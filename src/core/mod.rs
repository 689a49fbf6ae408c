//! Core systems: logging macros and platform-agnostic traits

pub mod logging;
pub mod traits;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// are exported at crate root via #[macro_export] in core::logging
