//! Mock platform implementations for host testing
//!
//! These mocks track the values written through the platform traits so
//! tests can verify controller behavior without hardware.

pub mod adc;
pub mod gpio;

pub use adc::MockAnalog;
pub use gpio::MockGpio;
