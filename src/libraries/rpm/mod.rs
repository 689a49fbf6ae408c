//! RPM sensor source
//!
//! The engine controller reads engine speed through this trait; the RPM
//! driver itself (hall sensor, optical pickup, ECU feed) lives with the
//! host platform.

/// Engine RPM feedback source
pub trait RpmSource {
    /// Latest RPM reading for a sensor instance (0-indexed)
    ///
    /// Returns `None` when the instance does not exist or has no valid
    /// reading.
    fn rpm(&self, instance: u8) -> Option<f32>;
}

/// Fixed-value RPM source for testing
#[derive(Debug, Default)]
pub struct MockRpm {
    reading: Option<f32>,
}

impl MockRpm {
    /// Create a source with no reading
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reading returned for every instance
    pub fn set_rpm(&mut self, rpm: Option<f32>) {
        self.reading = rpm;
    }
}

impl RpmSource for MockRpm {
    fn rpm(&self, _instance: u8) -> Option<f32> {
        self.reading
    }
}
