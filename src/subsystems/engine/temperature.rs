//! Engine temperature front-end
//!
//! Samples an analog sensor each tick, applies the configured transfer
//! function and a slow low-pass filter. The ADC channel handle is acquired
//! once by the host at init and borrowed per tick.

use libm::fabsf;

use crate::parameters::{IceParams, TempFunction};
use crate::platform::traits::AnalogSource;

use super::filter::SlowLowPass;

/// Reported in telemetry when no healthy sample exists
pub const TEMPERATURE_INVALID: f32 = -999.0;

/// Filtered engine temperature state
#[derive(Debug, Default)]
pub struct TemperatureSensor {
    filter: SlowLowPass,
    /// Telemetry rate-limit bookkeeping
    pub(crate) last_send_ms: u64,
}

impl TemperatureSensor {
    pub(crate) const fn new() -> Self {
        Self {
            filter: SlowLowPass::new(),
            last_send_ms: 0,
        }
    }

    /// Sample the sensor and fold the reading into the filter
    ///
    /// Invalid samples (misconfigured transfer function, hyperbolic
    /// division by zero, non-finite results) are dropped without touching
    /// the filtered value; health then decays via the staleness window.
    pub(crate) fn update(
        &mut self,
        params: &IceParams,
        adc: Option<&mut dyn AnalogSource>,
        now_ms: u64,
    ) {
        if params.temp_pin <= 0 {
            // disabled
            self.filter.reset();
            return;
        }
        let Some(adc) = adc else {
            return;
        };
        if adc.set_pin(params.temp_pin).is_err() {
            return;
        }

        let v = if params.temp_ratiometric {
            adc.voltage_average_ratiometric()
        } else {
            adc.voltage_average()
        };

        let new_value = match params.temp_function {
            Some(TempFunction::Linear) => (v - params.temp_offset) * params.temp_scaler,
            Some(TempFunction::Inverted) => (params.temp_offset - v) * params.temp_scaler,
            Some(TempFunction::Hyperbolic) => {
                let denom = v - params.temp_offset;
                if fabsf(denom) < f32::EPSILON {
                    // do not average in an invalid sample
                    return;
                }
                params.temp_scaler / denom
            }
            None => {
                // do not average in an invalid sample
                return;
            }
        };

        if new_value.is_finite() {
            self.filter.apply(new_value, now_ms);
        }
    }

    /// Filtered temperature when the sensor is healthy
    pub fn get(&self, now_ms: u64) -> Option<f32> {
        if self.healthy(now_ms) {
            Some(self.filter.value())
        } else {
            None
        }
    }

    /// Filtered value regardless of health (0 before any sample)
    pub(crate) fn value(&self) -> f32 {
        self.filter.value()
    }

    /// Whether the last good sample is within the staleness window
    pub fn healthy(&self, now_ms: u64) -> bool {
        self.filter.healthy(now_ms)
    }

    /// Temperature below the run floor
    pub(crate) fn too_cold(&self, params: &IceParams, now_ms: u64) -> bool {
        params.temp_min > 0.0 && self.healthy(now_ms) && self.filter.value() < params.temp_min
    }

    /// Temperature above the overheat limit
    pub(crate) fn too_hot(&self, params: &IceParams, now_ms: u64) -> bool {
        params.temp_max > 0.0 && self.healthy(now_ms) && self.filter.value() > params.temp_max
    }
}
