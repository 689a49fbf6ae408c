//! ICE Parameter Definitions
//!
//! Defines the engine controller parameters following ArduPilot naming
//! (`ICE_*`). The typed block is rebuilt from the store whenever the ground
//! station changes a value.
//!
//! # Parameters (selection)
//!
//! - `ICE_ENABLE` - Master enable for the controller
//! - `ICE_START_CHAN` - RC channel carrying the 3-position ignition switch
//! - `ICE_STARTER_TIME` - Starter engagement limit per attempt (s)
//! - `ICE_START_DELAY` - Dwell between start attempts (s)
//! - `ICE_RPM_THRESH` / `ICE_RPM_THRESH2` - Running / starting RPM gates
//! - `ICE_OPTIONS` - Behavior bitmask, see [`IceOptions`]
//! - `ICE_PWM_*_U` / `ICE_PWM_*_D` - Gear servo PWM table with hysteresis

use bitflags::bitflags;

use super::storage::{ParamFlags, ParamValue, ParameterStore, StoreError};

bitflags! {
    /// ICE_OPTIONS behavior bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct IceOptions: u16 {
        /// Arming is required before the ignition may energize
        const ARMING_REQUIRED_IGNITION = 1 << 0;
        /// Arming is required before starting or running
        const ARMING_REQUIRED_START = 1 << 1;
        /// Keep the engine running after a disarm
        const KEEP_RUNNING_WHEN_DISARMED = 1 << 2;
        /// Auto-nav modes override the RC switch and always start
        const AUTO_ALWAYS_AUTOSTART = 1 << 3;
        /// Running-RPM failure gets a 500 ms grace timer
        const RPM_FAIL_HAS_TIMER = 1 << 4;
        /// Running-RPM failure forces an ignition-off dwell
        const RUNNING_FAIL_FORCE_STOP = 1 << 5;
        /// Reject MAVLink/mission engine control commands
        const BLOCK_EXTERNAL_STARTER_CMDS = 1 << 6;
        /// Auto-nav modes force FORWARD gear while running
        const AUTO_SETS_GEAR_FORWARD = 1 << 7;
    }
}

/// Vehicle class the controller is built into
///
/// Ground vehicles have no altitude, so the start-height-delay path is
/// inert and overheating derates the throttle harder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    /// Rover, boat: no height delay, hot throttle factor 0.25
    Ground,
    /// Plane, VTOL: height delay available, hot throttle factor 0.75
    Airborne,
}

impl VehicleClass {
    fn hot_throttle_factor_default(self) -> f32 {
        match self {
            VehicleClass::Ground => 0.25,
            VehicleClass::Airborne => 0.75,
        }
    }
}

/// Temperature sensor transfer function (`ICE_TEMP_FUNC`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempFunction {
    /// temp = (voltage - offset) * scaler
    Linear = 0,
    /// temp = (offset - voltage) * scaler
    Inverted = 1,
    /// temp = scaler / (voltage - offset)
    Hyperbolic = 2,
}

impl TempFunction {
    /// Decode the parameter value; unknown values are invalid
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(TempFunction::Linear),
            1 => Some(TempFunction::Inverted),
            2 => Some(TempFunction::Hyperbolic),
            _ => None,
        }
    }
}

/// Gear servo PWM table
///
/// Each gear carries a `(down, up)` pair: the PWM to emit when approaching
/// the gear from a higher / lower numeric position respectively, absorbing
/// mechanical linkage hysteresis.
#[derive(Debug, Clone, Copy)]
pub struct GearPwmTable {
    pub park_down: u16,
    pub park_up: u16,
    pub reverse_down: u16,
    pub reverse_up: u16,
    pub neutral_down: u16,
    pub neutral_up: u16,
    pub forward1_down: u16,
    pub forward1_up: u16,
    pub forward2_down: u16,
    pub forward2_up: u16,
}

impl Default for GearPwmTable {
    fn default() -> Self {
        Self {
            park_down: 1000,
            park_up: 1000,
            reverse_down: 1200,
            reverse_up: 1200,
            neutral_down: 1295,
            neutral_up: 1295,
            forward1_down: 1425,
            forward1_up: 1425,
            forward2_down: 1600,
            forward2_up: 1600,
        }
    }
}

/// ICE parameters loaded from the parameter store
#[derive(Debug, Clone)]
pub struct IceParams {
    /// Controller enabled at all (`ICE_ENABLE`)
    pub enable: bool,
    /// RC channel for the ignition switch, 0 = none (`ICE_START_CHAN`)
    pub start_chan: u8,
    /// Starter engagement limit per attempt, s (`ICE_STARTER_TIME`)
    pub starter_time: f32,
    /// Dwell between start attempts, s (`ICE_START_DELAY`)
    pub start_delay: f32,
    /// Accessory-on to starter-on delay, s (`ICE_PWR_UP_WAIT`)
    pub power_up_time: i32,
    /// RPM sensor instance, 0 = none (`ICE_RPM_CHAN`)
    pub rpm_instance: u8,
    /// RPM above which a running engine is healthy (`ICE_RPM_THRESH`)
    pub rpm_threshold_running: i32,
    /// RPM above which starting succeeds early, 0 = off (`ICE_RPM_THRESH2`)
    pub rpm_threshold_starting: i32,
    /// Throttle percentage for engine start (`ICE_START_PCT`)
    pub start_percent: i16,
    /// Minimum throttle percentage while running (`ICE_IDLE_PCT`)
    pub idle_percent: i16,
    /// Temperature analog pin, <= 0 disables (`ICE_TEMP_PIN`)
    pub temp_pin: i16,
    /// Voltage-to-degC scaler (`ICE_TEMP_SCALER`)
    pub temp_scaler: f32,
    /// Voltage offset (`ICE_TEMP_OFFSET`)
    pub temp_offset: f32,
    /// Sensor output scales with supply rail (`ICE_TEMP_RMETRIC`)
    pub temp_ratiometric: bool,
    /// Transfer function (`ICE_TEMP_FUNC`); None when misconfigured
    pub temp_function: Option<TempFunction>,
    /// Too-cold-to-run limit, degC, 0 disables (`ICE_TEMP_MIN`)
    pub temp_min: f32,
    /// Overheat limit, degC, 0 disables (`ICE_TEMP_MAX`)
    pub temp_max: f32,
    /// Overheat throttle reduction factor (`ICE_TEMP_HOT_THR`)
    pub temp_hot_throttle_factor: f32,
    /// Behavior bitmask (`ICE_OPTIONS`)
    pub options: IceOptions,
    /// Auto-restart budget, -1 unlimited, 0 none (`ICE_RESTART_CNT`)
    pub restarts_allowed: i16,
    /// Master output-enable GPIO pin, -1 disabled (`ICE_OUT_EN_PIN`)
    pub master_output_enable_pin: i16,
    /// Additive offset on battery percent for the fuel gauge (`ICE_FUEL_OFFSET`)
    pub fuel_offset: f32,
    /// Gear servo PWM table (`ICE_PWM_*`)
    pub gear_pwm: GearPwmTable,
    /// Pre-shift dwell waiting for the vehicle to stop, s (`ICE_GEAR_STOP`)
    pub gear_stop_duration: f32,
    /// Physical shift time per gear position, s (`ICE_GEAR_DUR`)
    pub gear_change_duration_per_position: f32,
}

impl Default for IceParams {
    fn default() -> Self {
        Self::defaults(VehicleClass::Ground)
    }
}

impl IceParams {
    /// Factory defaults for a vehicle class
    pub fn defaults(vehicle: VehicleClass) -> Self {
        Self {
            enable: false,
            start_chan: 0,
            starter_time: 3.0,
            start_delay: 2.0,
            power_up_time: 0,
            rpm_instance: 0,
            rpm_threshold_running: 100,
            rpm_threshold_starting: 0,
            start_percent: 5,
            idle_percent: 0,
            temp_pin: -1,
            temp_scaler: 1.0,
            temp_offset: 0.0,
            temp_ratiometric: true,
            temp_function: Some(TempFunction::Linear),
            temp_min: 10.0,
            temp_max: 105.0,
            temp_hot_throttle_factor: vehicle.hot_throttle_factor_default(),
            options: IceOptions::empty(),
            restarts_allowed: -1,
            master_output_enable_pin: -1,
            fuel_offset: 0.0,
            gear_pwm: GearPwmTable::default(),
            gear_stop_duration: 0.0,
            gear_change_duration_per_position: 1.5,
        }
    }

    /// Register all ICE parameters with their default values
    pub fn register_defaults(
        store: &mut ParameterStore,
        vehicle: VehicleClass,
    ) -> Result<(), StoreError> {
        let d = Self::defaults(vehicle);
        let no_flags = ParamFlags::empty();

        store.register("ICE_ENABLE", ParamValue::Int(0), no_flags)?;
        store.register("ICE_START_CHAN", ParamValue::Int(0), no_flags)?;
        store.register("ICE_STARTER_TIME", ParamValue::Float(d.starter_time), no_flags)?;
        store.register("ICE_START_DELAY", ParamValue::Float(d.start_delay), no_flags)?;
        store.register("ICE_PWR_UP_WAIT", ParamValue::Int(0), no_flags)?;
        store.register("ICE_RPM_CHAN", ParamValue::Int(0), no_flags)?;
        store.register(
            "ICE_RPM_THRESH",
            ParamValue::Int(d.rpm_threshold_running),
            no_flags,
        )?;
        store.register("ICE_RPM_THRESH2", ParamValue::Int(0), no_flags)?;
        store.register("ICE_START_PCT", ParamValue::Int(d.start_percent as i32), no_flags)?;
        store.register("ICE_IDLE_PCT", ParamValue::Int(0), no_flags)?;
        store.register("ICE_TEMP_PIN", ParamValue::Int(-1), no_flags)?;
        store.register("ICE_TEMP_SCALER", ParamValue::Float(1.0), no_flags)?;
        store.register("ICE_TEMP_OFFSET", ParamValue::Float(0.0), no_flags)?;
        store.register("ICE_TEMP_RMETRIC", ParamValue::Int(1), no_flags)?;
        store.register("ICE_TEMP_FUNC", ParamValue::Int(0), no_flags)?;
        store.register("ICE_TEMP_MIN", ParamValue::Float(d.temp_min), no_flags)?;
        store.register("ICE_TEMP_MAX", ParamValue::Float(d.temp_max), no_flags)?;
        store.register(
            "ICE_TEMP_HOT_THR",
            ParamValue::Float(d.temp_hot_throttle_factor),
            no_flags,
        )?;
        store.register("ICE_OPTIONS", ParamValue::Int(0), no_flags)?;
        store.register("ICE_RESTART_CNT", ParamValue::Int(-1), no_flags)?;
        store.register("ICE_OUT_EN_PIN", ParamValue::Int(-1), no_flags)?;
        store.register("ICE_FUEL_OFFSET", ParamValue::Float(0.0), no_flags)?;

        let g = &d.gear_pwm;
        store.register("ICE_PWM_PARK_U", ParamValue::Int(g.park_up as i32), no_flags)?;
        store.register("ICE_PWM_PARK_D", ParamValue::Int(g.park_down as i32), no_flags)?;
        store.register("ICE_PWM_REV_U", ParamValue::Int(g.reverse_up as i32), no_flags)?;
        store.register("ICE_PWM_REV_D", ParamValue::Int(g.reverse_down as i32), no_flags)?;
        store.register("ICE_PWM_NTRL_U", ParamValue::Int(g.neutral_up as i32), no_flags)?;
        store.register("ICE_PWM_NTRL_D", ParamValue::Int(g.neutral_down as i32), no_flags)?;
        store.register("ICE_PWM_FWD1_U", ParamValue::Int(g.forward1_up as i32), no_flags)?;
        store.register("ICE_PWM_FWD1_D", ParamValue::Int(g.forward1_down as i32), no_flags)?;
        store.register("ICE_PWM_FWD2_U", ParamValue::Int(g.forward2_up as i32), no_flags)?;
        store.register("ICE_PWM_FWD2_D", ParamValue::Int(g.forward2_down as i32), no_flags)?;
        store.register(
            "ICE_GEAR_STOP",
            ParamValue::Float(d.gear_stop_duration),
            no_flags,
        )?;
        store.register(
            "ICE_GEAR_DUR",
            ParamValue::Float(d.gear_change_duration_per_position),
            no_flags,
        )?;

        Ok(())
    }

    /// Load ICE parameters from the store
    ///
    /// Missing entries fall back to the vehicle-class defaults.
    pub fn from_store(store: &ParameterStore, vehicle: VehicleClass) -> Self {
        let d = Self::defaults(vehicle);

        let int = |name: &str, fallback: i32| -> i32 {
            store.get(name).map(|v| v.as_i32()).unwrap_or(fallback)
        };
        let float = |name: &str, fallback: f32| -> f32 {
            store.get(name).map(|v| v.as_f32()).unwrap_or(fallback)
        };
        let pwm = |name: &str, fallback: u16| -> u16 {
            int(name, fallback as i32).clamp(0, u16::MAX as i32) as u16
        };

        Self {
            enable: int("ICE_ENABLE", 0) != 0,
            start_chan: int("ICE_START_CHAN", 0).clamp(0, 16) as u8,
            starter_time: float("ICE_STARTER_TIME", d.starter_time),
            start_delay: float("ICE_START_DELAY", d.start_delay),
            power_up_time: int("ICE_PWR_UP_WAIT", 0),
            rpm_instance: int("ICE_RPM_CHAN", 0).clamp(0, 2) as u8,
            rpm_threshold_running: int("ICE_RPM_THRESH", d.rpm_threshold_running),
            rpm_threshold_starting: int("ICE_RPM_THRESH2", 0),
            start_percent: int("ICE_START_PCT", d.start_percent as i32) as i16,
            idle_percent: int("ICE_IDLE_PCT", 0) as i16,
            temp_pin: int("ICE_TEMP_PIN", -1) as i16,
            temp_scaler: float("ICE_TEMP_SCALER", 1.0),
            temp_offset: float("ICE_TEMP_OFFSET", 0.0),
            temp_ratiometric: int("ICE_TEMP_RMETRIC", 1) != 0,
            temp_function: TempFunction::from_i32(int("ICE_TEMP_FUNC", 0)),
            temp_min: float("ICE_TEMP_MIN", d.temp_min),
            temp_max: float("ICE_TEMP_MAX", d.temp_max),
            temp_hot_throttle_factor: float("ICE_TEMP_HOT_THR", d.temp_hot_throttle_factor),
            options: IceOptions::from_bits_truncate(int("ICE_OPTIONS", 0) as u16),
            restarts_allowed: int("ICE_RESTART_CNT", -1) as i16,
            master_output_enable_pin: int("ICE_OUT_EN_PIN", -1) as i16,
            fuel_offset: float("ICE_FUEL_OFFSET", 0.0),
            gear_pwm: GearPwmTable {
                park_down: pwm("ICE_PWM_PARK_D", d.gear_pwm.park_down),
                park_up: pwm("ICE_PWM_PARK_U", d.gear_pwm.park_up),
                reverse_down: pwm("ICE_PWM_REV_D", d.gear_pwm.reverse_down),
                reverse_up: pwm("ICE_PWM_REV_U", d.gear_pwm.reverse_up),
                neutral_down: pwm("ICE_PWM_NTRL_D", d.gear_pwm.neutral_down),
                neutral_up: pwm("ICE_PWM_NTRL_U", d.gear_pwm.neutral_up),
                forward1_down: pwm("ICE_PWM_FWD1_D", d.gear_pwm.forward1_down),
                forward1_up: pwm("ICE_PWM_FWD1_U", d.gear_pwm.forward1_up),
                forward2_down: pwm("ICE_PWM_FWD2_D", d.gear_pwm.forward2_down),
                forward2_up: pwm("ICE_PWM_FWD2_U", d.gear_pwm.forward2_up),
            },
            gear_stop_duration: float("ICE_GEAR_STOP", d.gear_stop_duration),
            gear_change_duration_per_position: float(
                "ICE_GEAR_DUR",
                d.gear_change_duration_per_position,
            ),
        }
    }

    /// Pre-shift dwell with negative values treated as disabled
    pub fn gear_stop_ms(&self) -> u64 {
        if self.gear_stop_duration <= 0.0 {
            0
        } else {
            (self.gear_stop_duration * 1000.0) as u64
        }
    }

    /// Per-position shift duration with negative values treated as the default
    pub fn gear_duration_per_position_ms(&self) -> u64 {
        if self.gear_change_duration_per_position < 0.0 {
            2000
        } else {
            (self.gear_change_duration_per_position * 1000.0) as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_load_reproduces_defaults() {
        let mut store = ParameterStore::new();
        IceParams::register_defaults(&mut store, VehicleClass::Ground).unwrap();

        let params = IceParams::from_store(&store, VehicleClass::Ground);
        assert!(!params.enable);
        assert_eq!(params.start_chan, 0);
        assert_eq!(params.starter_time, 3.0);
        assert_eq!(params.start_delay, 2.0);
        assert_eq!(params.rpm_threshold_running, 100);
        assert_eq!(params.rpm_threshold_starting, 0);
        assert_eq!(params.restarts_allowed, -1);
        assert_eq!(params.temp_function, Some(TempFunction::Linear));
        assert_eq!(params.gear_pwm.neutral_up, 1295);
        assert_eq!(params.gear_change_duration_per_position, 1.5);
    }

    #[test]
    fn test_hot_throttle_default_by_vehicle_class() {
        let ground = IceParams::defaults(VehicleClass::Ground);
        let air = IceParams::defaults(VehicleClass::Airborne);
        assert_eq!(ground.temp_hot_throttle_factor, 0.25);
        assert_eq!(air.temp_hot_throttle_factor, 0.75);
    }

    #[test]
    fn test_gcs_set_flows_through() {
        let mut store = ParameterStore::new();
        IceParams::register_defaults(&mut store, VehicleClass::Ground).unwrap();

        store.set("ICE_ENABLE", ParamValue::Int(1)).unwrap();
        store.set("ICE_START_CHAN", ParamValue::Int(7)).unwrap();
        store.set("ICE_OPTIONS", ParamValue::Int(0b0011)).unwrap();

        let params = IceParams::from_store(&store, VehicleClass::Ground);
        assert!(params.enable);
        assert_eq!(params.start_chan, 7);
        assert!(params.options.contains(IceOptions::ARMING_REQUIRED_IGNITION));
        assert!(params.options.contains(IceOptions::ARMING_REQUIRED_START));
        assert!(!params.options.contains(IceOptions::AUTO_ALWAYS_AUTOSTART));
    }

    #[test]
    fn test_temp_function_decode() {
        assert_eq!(TempFunction::from_i32(0), Some(TempFunction::Linear));
        assert_eq!(TempFunction::from_i32(1), Some(TempFunction::Inverted));
        assert_eq!(TempFunction::from_i32(2), Some(TempFunction::Hyperbolic));
        assert_eq!(TempFunction::from_i32(3), None);
        assert_eq!(TempFunction::from_i32(-1), None);
    }

    #[test]
    fn test_negative_gear_timing_sanitized() {
        let mut params = IceParams::default();
        params.gear_stop_duration = -1.0;
        params.gear_change_duration_per_position = -2.0;

        assert_eq!(params.gear_stop_ms(), 0);
        assert_eq!(params.gear_duration_per_position_ms(), 2000);
    }

    #[test]
    fn test_gear_timing_ms() {
        let mut params = IceParams::default();
        params.gear_stop_duration = 1.0;
        params.gear_change_duration_per_position = 1.5;

        assert_eq!(params.gear_stop_ms(), 1000);
        assert_eq!(params.gear_duration_per_position_ms(), 1500);
    }
}
