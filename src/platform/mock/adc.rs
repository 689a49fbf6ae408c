//! Mock analog input implementation for testing

use crate::platform::{Result, traits::AnalogSource};

/// Mock analog channel
///
/// Tests set the voltage the next reads will return; the mock records the
/// routed pin and read counts for verification.
#[derive(Debug, Default)]
pub struct MockAnalog {
    voltage: f32,
    pin: i16,
    reads: u32,
}

impl MockAnalog {
    /// Create a new mock channel reading 0 V
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voltage returned by subsequent reads
    pub fn set_voltage(&mut self, volts: f32) {
        self.voltage = volts;
    }

    /// Pin the channel was last routed to
    pub fn pin(&self) -> i16 {
        self.pin
    }

    /// Number of voltage reads performed
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl AnalogSource for MockAnalog {
    fn set_pin(&mut self, pin: i16) -> Result<()> {
        self.pin = pin;
        Ok(())
    }

    fn voltage_average(&mut self) -> f32 {
        self.reads += 1;
        self.voltage
    }

    fn voltage_average_ratiometric(&mut self) -> f32 {
        self.reads += 1;
        self.voltage
    }
}
