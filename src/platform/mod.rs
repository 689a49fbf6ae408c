//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the controller's I/O:
//! the master output-enable GPIO and the analog temperature input.
//! Platform-specific code must stay isolated behind these traits.

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{AnalogSource, GpioInterface, GpioMode};
