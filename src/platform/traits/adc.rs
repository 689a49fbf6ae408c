//! Analog input interface trait
//!
//! Defines the sampled analog channel interface the temperature front-end
//! reads through. Implementations own the underlying ADC channel; the
//! controller only selects the pin and reads averaged voltages.

use crate::platform::Result;

/// Averaged analog input channel
///
/// Platform implementations must provide this interface for analog sampling.
///
/// # Safety Invariants
///
/// - The channel must be acquired once at init and kept for the life of the
///   controller; re-acquisition mid-tick is not supported
/// - Only one owner per channel instance
pub trait AnalogSource {
    /// Route the channel to the given analog pin
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Adc(AdcError::InvalidPin)` if the pin is not
    /// an analog-capable pin on this platform.
    fn set_pin(&mut self, pin: i16) -> Result<()>;

    /// Averaged absolute voltage since the last read (V)
    fn voltage_average(&mut self) -> f32;

    /// Averaged ratiometric voltage since the last read (V)
    ///
    /// Ratiometric sensors scale with the supply rail; the returned value is
    /// normalized against the measured supply voltage.
    fn voltage_average_ratiometric(&mut self) -> f32;
}
