//! Platform interface traits
//!
//! Trait definitions that platform implementations must provide.

pub mod adc;
pub mod gpio;

pub use adc::AnalogSource;
pub use gpio::{GpioInterface, GpioMode};
