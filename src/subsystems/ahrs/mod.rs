//! AHRS position source
//!
//! The start-height-delay state needs the vehicle's altitude relative to
//! the EKF origin; the AHRS itself lives with the host autopilot.

use nalgebra::Vector3;

/// Origin-relative position feedback source
pub trait PositionSource {
    /// Position relative to the navigation origin, NED frame (m)
    ///
    /// Returns `None` while the navigation solution is unavailable.
    fn relative_position_ned_origin(&self) -> Option<Vector3<f32>>;
}

/// Fixed-position source for testing
#[derive(Debug, Default)]
pub struct MockPosition {
    position: Option<Vector3<f32>>,
}

impl MockPosition {
    /// Create a source with no solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reported NED position
    pub fn set_position(&mut self, ned: Option<Vector3<f32>>) {
        self.position = ned;
    }

    /// Set the reported altitude above origin (m), zero horizontal offset
    pub fn set_altitude(&mut self, up_m: f32) {
        self.position = Some(Vector3::new(0.0, 0.0, -up_m));
    }
}

impl PositionSource for MockPosition {
    fn relative_position_ned_origin(&self) -> Option<Vector3<f32>> {
        self.position
    }
}
