//! Fuel level front-end
//!
//! The tank level sender is wired into a spare battery monitor instance
//! reporting percent remaining; this front-end filters it and applies the
//! configured offset.

use crate::libraries::battery::BatteryMonitor;
use crate::parameters::IceParams;

use super::filter::SlowLowPass;

/// Battery monitor instance carrying the fuel level sender
const FUEL_BATTERY_INSTANCE: u8 = 1;

/// Reported in telemetry when the monitor is unhealthy
pub const FUEL_LEVEL_INVALID: f32 = -1.0;

/// Filtered fuel level state
#[derive(Debug, Default)]
pub struct FuelSensor {
    filter: SlowLowPass,
    valid: bool,
    /// Telemetry rate-limit bookkeeping
    pub(crate) last_send_ms: u64,
}

impl FuelSensor {
    pub(crate) const fn new() -> Self {
        Self {
            filter: SlowLowPass::new(),
            valid: false,
            last_send_ms: 0,
        }
    }

    /// Fold in the monitor's percent-remaining reading
    pub(crate) fn update(
        &mut self,
        params: &IceParams,
        battery: Option<&dyn BatteryMonitor>,
        now_ms: u64,
    ) {
        let Some(battery) = battery else {
            self.valid = false;
            return;
        };
        if !battery.healthy(FUEL_BATTERY_INSTANCE) {
            self.valid = false;
            return;
        }

        let pct = battery.capacity_remaining_pct(FUEL_BATTERY_INSTANCE) + params.fuel_offset;
        self.filter.apply(pct, now_ms);
        self.valid = true;
    }

    /// Filtered level in percent, or `None` while the monitor is unhealthy
    pub fn level(&self) -> Option<f32> {
        if self.valid {
            Some(self.filter.value())
        } else {
            None
        }
    }

    /// Level for telemetry, with the invalid sentinel
    pub(crate) fn level_or_invalid(&self) -> f32 {
        self.level().unwrap_or(FUEL_LEVEL_INVALID)
    }
}
