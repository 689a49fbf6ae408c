//! Internal combustion engine controller
//!
//! Mediates between the vehicle (arming, auto-mission, pilot switch) and
//! the engine actuators (ignition relay, starter motor, gear servo,
//! throttle, brake). The controller is pure logic driven by a periodic
//! `update` tick; all hardware access goes through the traits bundled in
//! [`EngineIo`].
//!
//! Within a tick the order is fixed: sensors, state evaluation, gear,
//! outputs, telemetry, so outputs and telemetry always reflect the state
//! computed in the same tick. All timing derives from a single `now_ms`
//! captured at tick start.

mod filter;
pub mod fuel;
pub mod gear;
pub mod state;
pub mod temperature;

pub use fuel::{FuelSensor, FUEL_LEVEL_INVALID};
pub use gear::{Gear, GearState, PendingChange, GEAR_PWM_INVALID};
pub use state::{EngineState, IgnitionState};
pub use temperature::{TemperatureSensor, TEMPERATURE_INVALID};

use heapless::Vec;
use libm::fabsf;

use crate::communication::mavlink::status_notifier::{StatusMessage, StatusNotifier};
use crate::communication::mavlink::telemetry::IceCommandLong;
use crate::core::traits::TimeSource;
use crate::libraries::battery::BatteryMonitor;
use crate::libraries::rc_channel::RcInput;
use crate::libraries::rpm::RpmSource;
use crate::libraries::srv_channel::{SrvChannels, SrvFunction};
use crate::parameters::{IceOptions, IceParams, VehicleClass};
use crate::platform::traits::{AnalogSource, GpioInterface, GpioMode};
use crate::subsystems::ahrs::PositionSource;

use self::gear::{GearRequest, GearTick};

/// Status index reported in outbound messages (single engine)
const STATUS_INDEX: u8 = 0;
/// Minimum interval between unforced status sends (ms)
const STATUS_INTERVAL_MS: u64 = 1000;
/// Grace before a running-RPM dropout is acted on, when enabled (ms)
const RUNNING_RPM_FAIL_GRACE_MS: u64 = 500;
/// Forced ignition-off dwell after a running failure (ms)
const FORCED_NO_IGNITION_MS: u64 = 3000;

/// Everything the controller touches outside itself during a tick
///
/// The original reached these through process-wide singletons; here the
/// host owns them and lends them per call.
pub struct EngineIo<'a> {
    pub rc: &'a mut RcInput,
    pub srv: &'a mut SrvChannels,
    /// Master output-enable pin, when `ICE_OUT_EN_PIN` is configured
    pub master_enable: Option<&'a mut dyn GpioInterface>,
    /// Analog channel for the temperature sensor
    pub analog: Option<&'a mut dyn AnalogSource>,
    pub rpm: Option<&'a dyn RpmSource>,
    pub battery: Option<&'a dyn BatteryMonitor>,
    pub position: Option<&'a dyn PositionSource>,
    /// Vehicle soft-armed state this tick
    pub armed: bool,
}

/// Engine lifecycle controller
///
/// One instance per engine, owned by the autopilot scheduler. `update`
/// runs at the vehicle loop rate; `throttle_override` and `brake_override`
/// are called synchronously from the control loop on the same thread.
pub struct EngineController<T: TimeSource> {
    time: T,
    vehicle: VehicleClass,
    params: IceParams,

    state: EngineState,
    state_prev: EngineState,
    start_control: IgnitionState,
    run_once: bool,

    starting_attempts: u16,
    state_change_ms: u64,
    starter_start_ms: u64,
    starter_last_run_ms: u64,
    power_up_wait_start_ms: u64,
    running_rpm_fail_start_ms: u64,
    force_no_ignition_until_ms: u64,

    height_pending: bool,
    initial_height: f32,
    height_required: f32,

    auto_mode_active: bool,
    brake_release_in_neutral: bool,
    force_send_status: bool,

    gear: Gear,
    temperature: TemperatureSensor,
    fuel: FuelSensor,
    notifier: StatusNotifier,
}

impl<T: TimeSource> EngineController<T> {
    /// Create a controller
    ///
    /// Exactly one instance may exist per engine; the construction site is
    /// responsible for that, there is no runtime guard.
    pub fn new(time: T, vehicle: VehicleClass, params: IceParams) -> Self {
        Self {
            time,
            vehicle,
            params,
            state: EngineState::Off,
            state_prev: EngineState::Off,
            start_control: IgnitionState::Off,
            run_once: false,
            starting_attempts: 0,
            state_change_ms: 0,
            starter_start_ms: 0,
            starter_last_run_ms: 0,
            power_up_wait_start_ms: 0,
            running_rpm_fail_start_ms: 0,
            force_no_ignition_until_ms: 0,
            height_pending: false,
            initial_height: 0.0,
            height_required: 0.0,
            auto_mode_active: false,
            brake_release_in_neutral: false,
            force_send_status: false,
            gear: Gear::new(),
            temperature: TemperatureSensor::new(),
            fuel: FuelSensor::new(),
            notifier: StatusNotifier::new(),
        }
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current commanded ignition intent
    pub fn ignition_state(&self) -> IgnitionState {
        self.start_control
    }

    /// Transmission state
    pub fn gear(&self) -> &Gear {
        &self.gear
    }

    /// Start attempts since the last OFF
    pub fn starting_attempts(&self) -> u16 {
        self.starting_attempts
    }

    /// Timestamp of the last state transition (ms)
    pub fn state_change_ms(&self) -> u64 {
        self.state_change_ms
    }

    /// Filtered engine temperature, when the sensor is healthy
    pub fn get_temperature(&self) -> Option<f32> {
        self.temperature.get(self.time.now_ms())
    }

    /// Filtered fuel level in percent, when the gauge is valid
    pub fn fuel_level(&self) -> Option<f32> {
        self.fuel.level()
    }

    /// Throttle percentage the host should command while starting
    pub fn start_throttle_pct(&self) -> i16 {
        self.params.start_percent
    }

    /// Active parameters
    pub fn params(&self) -> &IceParams {
        &self.params
    }

    /// Told by the vehicle code whether an auto-nav mode is active
    pub fn set_auto_mode_active(&mut self, active: bool) {
        self.auto_mode_active = active;
    }

    /// Pop the oldest pending GCS status text
    pub fn pop_status_text(&mut self) -> Option<StatusMessage> {
        self.notifier.pop()
    }

    /// Replace the active parameters after a ground-station change
    pub fn apply_params(&mut self, params: IceParams) {
        self.params = params;
    }

    /// Periodic tick: sensors, state machine, gear, outputs, telemetry
    ///
    /// Returns the status messages due this tick.
    pub fn update(&mut self, io: &mut EngineIo<'_>) -> Vec<IceCommandLong, 3> {
        let now_ms = self.time.now_ms();

        if !self.params.enable {
            self.state = EngineState::Off;
            self.state_prev = EngineState::Off;
            if self.run_once {
                self.run_once = false;
                self.init(true, io);
            }
            return Vec::new();
        }

        if !self.run_once {
            self.run_once = true;
            self.init(false, io);
        }

        let analog: Option<&mut dyn AnalogSource> = match io.analog.as_mut() {
            Some(a) => Some(&mut **a),
            None => None,
        };
        self.temperature.update(&self.params, analog, now_ms);
        self.fuel.update(&self.params, io.battery, now_ms);

        self.determine_state(io, now_ms);

        self.update_gear(now_ms);

        self.set_output_channels(io.srv);

        self.send_status(io.srv, now_ms)
    }

    /// Initialize outputs, optionally keeping them inhibited
    fn init(&mut self, inhibit_outputs: bool, io: &mut EngineIo<'_>) {
        if self.params.master_output_enable_pin >= 0 {
            if let Some(gpio) = io.master_enable.as_mut() {
                let _ = gpio.set_mode(GpioMode::OutputPushPull);
                // the pin silences all outputs while low
                let _ = if inhibit_outputs {
                    gpio.set_low()
                } else {
                    gpio.set_high()
                };
            }
        }

        self.set_output_channels(io.srv);

        // seed the start switch with its trim so the boot intent is defined
        // before the receiver reports in; a live reading wins
        match io.rc.get_trim(self.params.start_chan) {
            Some(trim) => {
                if io.rc.get_radio_in(self.params.start_chan).is_none() {
                    io.rc.set_override(self.params.start_chan, trim);
                }
                let boot_pwm = io.rc.get_radio_in(self.params.start_chan).unwrap_or(trim);
                self.start_control = IgnitionState::from_pwm(boot_pwm);
            }
            None => {
                self.start_control = IgnitionState::Off;
            }
        }

        self.gear.cancel_pending();
    }

    /// Advance the engine state machine
    fn determine_state(&mut self, io: &mut EngineIo<'_>, now_ms: u64) {
        // resolve the commanded ignition intent
        if self.auto_mode_active && self.params.options.contains(IceOptions::AUTO_ALWAYS_AUTOSTART)
        {
            if self.start_control != IgnitionState::StartRun {
                self.start_control = IgnitionState::StartRun;
                self.force_send_status = true;
            }
        } else if let Some(pwm) = io.rc.get_radio_in(self.params.start_chan) {
            self.start_control = IgnitionState::from_pwm(pwm);
        }

        let armed = io.armed;
        let arming_ok_to_ign =
            armed || !self.params.options.contains(IceOptions::ARMING_REQUIRED_IGNITION);
        let arming_ok_to_start_or_run =
            armed || !self.params.options.contains(IceOptions::ARMING_REQUIRED_START);
        let system_should_be_off =
            self.start_control == IgnitionState::Off || !arming_ok_to_ign;

        if system_should_be_off {
            if self.state != EngineState::Off {
                self.notifier.info(format_args!("Engine stopped"));
            }
            self.state = EngineState::Off;
        }

        let current_rpm: Option<i32> = if self.params.rpm_instance > 0 {
            io.rpm
                .and_then(|r| r.rpm(self.params.rpm_instance - 1))
                .map(|r| r as i32)
        } else {
            None
        };

        match self.state {
            EngineState::Off => {
                self.starting_attempts = 0;
                if !system_should_be_off && self.start_control != IgnitionState::Off {
                    self.state = EngineState::StartDelay;
                }
            }

            EngineState::StartHeightDelay => {
                // only reachable via engine_control on airborne vehicles
                if let Some(pos) =
                    io.position.and_then(|p| p.relative_position_ned_origin())
                {
                    let altitude = -pos.z;
                    if self.height_pending || !armed {
                        // reset the reference while disarmed or when re-armed
                        self.height_pending = false;
                        self.initial_height = altitude;
                    } else if altitude >= self.initial_height + self.height_required {
                        self.notifier.info(format_args!(
                            "Engine starting height reached {:.1}",
                            altitude - self.initial_height
                        ));
                        self.state = EngineState::Starting;
                    }
                }
            }

            EngineState::StartDelayNoIgnition => {
                // keep everything de-energized until the dwell expires, so a
                // still-spinning engine cannot keep itself alive through the
                // retry
                if now_ms >= self.force_no_ignition_until_ms {
                    self.force_no_ignition_until_ms = 0;
                    self.state = EngineState::StartDelay;
                }
            }

            EngineState::StartDelay => {
                let start_wanted =
                    self.start_control == IgnitionState::StartRun && arming_ok_to_start_or_run;
                let budget_ok = !(self.params.restarts_allowed >= 0
                    && self.starting_attempts as i16 > self.params.restarts_allowed);

                // lingers forever when the switch or budget says no; only
                // OFF clears the attempt counter
                if start_wanted && budget_ok && self.power_up_wait_complete(now_ms) {
                    let delay_ms = (self.params.start_delay * 1000.0) as u64;
                    if self.params.start_delay <= 0.0
                        || self.starter_last_run_ms == 0
                        || now_ms.saturating_sub(self.starter_last_run_ms) >= delay_ms
                    {
                        self.notifier.info(format_args!(
                            "Engine starting for up to {:.1}s",
                            self.params.starter_time
                        ));
                        self.state = EngineState::Starting;
                    }
                }
            }

            EngineState::Starting => {
                self.power_up_wait_start_ms = 0;
                if self.starter_start_ms == 0 {
                    // first tick of the attempt
                    self.starting_attempts += 1;
                    self.starter_start_ms = now_ms;
                }
                self.starter_last_run_ms = now_ms;

                let starter_time_ms = (self.params.starter_time * 1000.0) as u64;
                let thresh2 = self.params.rpm_threshold_starting;

                if !arming_ok_to_start_or_run {
                    // user abort
                    self.notifier.info(format_args!("Engine stopped"));
                    self.state = EngineState::StartDelay;
                } else if thresh2 > 0 && current_rpm.is_some_and(|rpm| rpm >= thresh2) {
                    self.notifier.info(format_args!(
                        "Engine running! Detected {} rpm",
                        current_rpm.unwrap_or(0)
                    ));
                    self.state = EngineState::Running;
                } else if now_ms.saturating_sub(self.starter_start_ms) >= starter_time_ms {
                    if thresh2 <= 0 {
                        // no rpm feedback configured, assume success
                        self.notifier
                            .info(format_args!("Engine running! (No rpm feedback)"));
                        self.state = EngineState::Running;
                    } else {
                        match current_rpm {
                            None => {
                                self.notifier.info(format_args!(
                                    "Engine start failed. Check rpm configuration"
                                ));
                                self.state = EngineState::Off;
                            }
                            Some(rpm) => {
                                self.notifier.info(format_args!(
                                    "Engine start failed. Detected {} rpm",
                                    rpm
                                ));
                                self.state = EngineState::StartDelay;
                            }
                        }
                    }
                }
            }

            EngineState::Running => {
                self.power_up_wait_start_ms = 0;

                if !armed
                    && self.params.idle_percent <= 0
                    && !self
                        .params
                        .options
                        .contains(IceOptions::KEEP_RUNNING_WHEN_DISARMED)
                {
                    self.state = EngineState::Off;
                    self.notifier.info(format_args!("Engine stopped, disarmed"));
                } else if self.params.rpm_threshold_running > 0
                    && current_rpm.is_some_and(|rpm| rpm < self.params.rpm_threshold_running)
                {
                    // engine has stopped when it should be running
                    if self.running_rpm_fail_start_ms == 0 {
                        self.running_rpm_fail_start_ms = now_ms;
                    }

                    let within_grace = self
                        .params
                        .options
                        .contains(IceOptions::RPM_FAIL_HAS_TIMER)
                        && now_ms.saturating_sub(self.running_rpm_fail_start_ms)
                            <= RUNNING_RPM_FAIL_GRACE_MS;

                    if !within_grace {
                        if self
                            .params
                            .options
                            .contains(IceOptions::RUNNING_FAIL_FORCE_STOP)
                        {
                            // a noisy rpm signal must not leave the ignition on
                            self.state = EngineState::StartDelayNoIgnition;
                            self.force_no_ignition_until_ms = now_ms + FORCED_NO_IGNITION_MS;
                        } else {
                            self.state = EngineState::StartDelay;
                        }
                        self.notifier.info(format_args!(
                            "Engine died while running: {} rpm",
                            current_rpm.unwrap_or(0)
                        ));
                    }
                } else {
                    self.running_rpm_fail_start_ms = 0;
                }
            }
        }

        if self.state != EngineState::Starting {
            self.starter_start_ms = 0;
        }
        if self.state_prev != self.state {
            self.state_change_ms = now_ms;
        }
        self.state_prev = self.state;
    }

    /// Power-up wait gate for START_DELAY
    ///
    /// Stamps the wait start and logs once on the first blocked tick.
    fn power_up_wait_complete(&mut self, now_ms: u64) -> bool {
        if self.params.power_up_time <= 0 {
            return true;
        }
        if self.power_up_wait_start_ms == 0 {
            self.notifier.info(format_args!(
                "Engine waiting for {}s",
                self.params.power_up_time
            ));
            self.power_up_wait_start_ms = now_ms;
            return false;
        }
        now_ms.saturating_sub(self.power_up_wait_start_ms)
            >= self.params.power_up_time as u64 * 1000
    }

    /// Advance the gear state machine
    fn update_gear(&mut self, now_ms: u64) {
        match self.gear.tick(&self.params, now_ms) {
            GearTick::ShiftStarted => {
                self.force_send_status = true;
            }
            GearTick::Completed(gear) => {
                self.notifier
                    .info(format_args!("Gear is now {}", gear.name()));
                self.force_send_status = true;
            }
            GearTick::None => {
                if self.auto_mode_active
                    && self.state == EngineState::Running
                    && self
                        .params
                        .options
                        .contains(IceOptions::AUTO_SETS_GEAR_FORWARD)
                    && !self.gear.set_by_automission
                    && !self.gear.state.is_forward()
                    && !self.gear.change_in_flight()
                {
                    self.set_gear(GearState::Forward, 0);
                }
            }
        }
    }

    /// Request a transmission change
    ///
    /// `explicit_pwm` is only used with [`GearState::PwmValue`]. Returns
    /// whether the request was accepted (requesting the current or already
    /// pending gear counts as success).
    pub fn set_gear(&mut self, target: GearState, explicit_pwm: u16) -> bool {
        let now_ms = self.time.now_ms();
        match self.gear.request(target, explicit_pwm, &self.params, now_ms) {
            GearRequest::Unchanged => true,
            GearRequest::Rejected => false,
            GearRequest::Started {
                from,
                to,
                total_shift_ms,
            } => {
                self.force_send_status = true;
                self.notifier.info(format_args!(
                    "Gear change: {} to {} in {:.1}s",
                    from.name(),
                    to.name(),
                    total_shift_ms as f32 * 0.001
                ));
                true
            }
        }
    }

    /// Drive the output channels from the current state
    fn set_output_channels(&mut self, srv: &mut SrvChannels) {
        if !srv.function_assigned(SrvFunction::EngineGear) {
            // no gear servo, keep the state at a known invalid
            self.gear.pwm_active = GEAR_PWM_INVALID;
            self.gear.state = GearState::Unknown;
        } else if self.gear.state == GearState::Unknown {
            // on boot, emit the trim and classify whatever it reads back as
            srv.set_output_to_trim(SrvFunction::EngineGear);
            if let Some(pwm) = srv.get_output_pwm(SrvFunction::EngineGear) {
                self.gear.pwm_active = pwm;
                self.gear.state = Gear::classify_pwm(pwm, &self.params.gear_pwm);
            }
        } else {
            srv.set_output_pwm(SrvFunction::EngineGear, self.gear.pwm_active);
        }

        if self.gear.change_in_flight() && self.state != EngineState::Off {
            // never cut ignition mid-shift; OFF still overrides
            return;
        }

        match self.state {
            EngineState::Off | EngineState::StartDelayNoIgnition => {
                // trim value dictates the off state
                srv.set_output_to_trim(SrvFunction::Ignition);
                srv.set_output_to_trim(SrvFunction::Starter);
            }
            EngineState::StartHeightDelay | EngineState::StartDelay => {
                srv.set_output_scaled(SrvFunction::Ignition, 100.0);
                srv.set_output_scaled(SrvFunction::Starter, 0.0);
            }
            EngineState::Starting => {
                srv.set_output_scaled(SrvFunction::Ignition, 100.0);
                srv.set_output_scaled(SrvFunction::Starter, 100.0);
            }
            EngineState::Running => {
                srv.set_output_scaled(SrvFunction::Ignition, 100.0);
                srv.set_output_scaled(SrvFunction::Starter, 0.0);
            }
        }
    }

    /// Shape the throttle the navigation layer is requesting
    ///
    /// Forces idle while starting, cold or mid-shift, floors a running
    /// engine at idle, and derates an overheating one. Returns whether
    /// `percentage` was altered.
    pub fn throttle_override(&self, percentage: &mut f32, srv: &SrvChannels) -> bool {
        if !self.params.enable {
            return false;
        }

        let now_ms = self.time.now_ms();
        let percentage_old = *percentage;
        let mut use_idle_percent = false;

        if self.state == EngineState::Running
            && self.params.idle_percent > 0
            && self.params.idle_percent < 100
            && srv
                .get_output_scaled(SrvFunction::Throttle)
                .is_some_and(|throttle| (self.params.idle_percent as f32) > throttle)
        {
            use_idle_percent = true;
        } else if matches!(self.state, EngineState::Starting | EngineState::StartDelay)
            || self.temperature.too_cold(&self.params, now_ms)
            || self.gear.change_in_flight()
        {
            use_idle_percent = true;
        } else if self.temperature.too_hot(&self.params, now_ms) {
            *percentage *= self.params.temp_hot_throttle_factor.clamp(0.0, 1.0);
        }

        if use_idle_percent {
            // zero here could kill the engine, idle instead
            *percentage = self.params.idle_percent as f32;
        }

        !is_equal(percentage_old, *percentage)
    }

    /// Shape the brake the navigation layer is requesting
    ///
    /// Holds the vehicle while disarmed or stopped in a driving gear and
    /// during any gear change. Returns whether `brake_percent` was altered.
    pub fn brake_override(
        &self,
        brake_percent: &mut f32,
        desired_speed: f32,
        speed_is_valid: bool,
        speed: f32,
        armed: bool,
    ) -> bool {
        if !self.params.enable {
            return false;
        }

        let brake_percent_start = *brake_percent;

        match self.gear.state {
            GearState::Reverse
            | GearState::Reverse1
            | GearState::Forward
            | GearState::Forward1
            | GearState::Forward2 => {
                if !armed {
                    *brake_percent = 100.0;
                } else if is_equal(desired_speed, 0.0) && speed_is_valid && fabsf(speed) < 0.1 {
                    // we want speed 0 and we are about speed 0
                    *brake_percent = 100.0;
                }
            }

            GearState::Neutral => {
                if !armed {
                    *brake_percent = if self.brake_release_in_neutral {
                        // operator wants to push the vehicle
                        0.0
                    } else {
                        100.0
                    };
                }
            }

            GearState::Unknown | GearState::Park | GearState::PwmValue => {
                // no brake management
            }
        }

        if self.gear.change_in_flight() {
            *brake_percent = 100.0;
        }

        !is_equal(brake_percent_start, *brake_percent)
    }

    /// Handle a DO_ENGINE_CONTROL command from MAVLink or a mission
    ///
    /// Returns whether the command was accepted.
    pub fn engine_control(
        &mut self,
        start_control: i32,
        _cold_start: i32,
        height_delay: f32,
        gear_state: i32,
        from_mission: bool,
        rc: &RcInput,
    ) -> bool {
        if self
            .params
            .options
            .contains(IceOptions::BLOCK_EXTERNAL_STARTER_CMDS)
        {
            self.notifier
                .info(format_args!("Engine: external starter commands are blocked"));
            return false;
        }

        if !(self.auto_mode_active
            && self.params.options.contains(IceOptions::AUTO_ALWAYS_AUTOSTART))
        {
            // the pilot's off switch blocks external commands
            if let Some(pwm) = rc.get_radio_in(self.params.start_chan) {
                if IgnitionState::from_pwm(pwm) == IgnitionState::Off {
                    self.notifier
                        .info(format_args!("Engine: start control disabled"));
                    return false;
                }
            }
        }

        if self.vehicle == VehicleClass::Airborne && height_delay > 0.0 {
            self.height_pending = true;
            self.initial_height = 0.0;
            self.height_required = height_delay;
            self.state = EngineState::StartHeightDelay;
            self.notifier
                .info(format_args!("Takeoff height set to {:.1}m", height_delay));
        }

        if let Some(intent) = IgnitionState::from_start_control(start_control) {
            self.start_control = intent;
            self.force_send_status = true;
            self.gear.set_by_automission = from_mission;
        }

        if let Some(gear) = GearState::from_wire(gear_state) {
            if gear != GearState::Unknown
                && gear != GearState::PwmValue
                && self.set_gear(gear, 0)
            {
                self.force_send_status = true;
                self.gear.set_by_automission = from_mission;
            }
        }

        true
    }

    /// Handle the private set-transmission-state command
    ///
    /// `param2` = gear, `param3` = explicit PWM (with the PWM_VALUE gear),
    /// `param4` != 0 releases the brake in neutral while disarmed.
    pub fn handle_set_transmission_state(
        &mut self,
        gear_state: i32,
        pwm_value: u16,
        brake_release_in_neutral: bool,
    ) -> bool {
        let Some(gear) = GearState::from_wire(gear_state) else {
            return false;
        };
        if self.set_gear(gear, pwm_value) {
            self.brake_release_in_neutral = brake_release_in_neutral;
            self.gear.set_by_automission = false;
            return true;
        }
        false
    }

    /// Emit the periodic status messages
    ///
    /// Each of the three messages is rate limited to 1 Hz independently; a
    /// pending force-send bypasses the limit for all of them once.
    fn send_status(&mut self, srv: &SrvChannels, now_ms: u64) -> Vec<IceCommandLong, 3> {
        let force = self.force_send_status;
        self.force_send_status = false;

        let mut messages: Vec<IceCommandLong, 3> = Vec::new();

        if force || now_ms.saturating_sub(self.temperature.last_send_ms) >= STATUS_INTERVAL_MS {
            let temp = self
                .temperature
                .get(now_ms)
                .unwrap_or(TEMPERATURE_INVALID);
            let _ = messages.push(IceCommandLong::coolant_temp(
                STATUS_INDEX,
                temp,
                self.params.temp_max,
                self.params.temp_min,
            ));
            self.temperature.last_send_ms = now_ms;
        }

        if let Some(gear_pwm) = srv.get_output_pwm(SrvFunction::EngineGear) {
            if force || now_ms.saturating_sub(self.gear.last_send_ms) >= STATUS_INTERVAL_MS {
                let _ = messages.push(IceCommandLong::transmission_state(
                    STATUS_INDEX,
                    self.gear.state.wire_value(),
                    gear_pwm,
                    self.start_control as u8,
                ));
                self.gear.last_send_ms = now_ms;
            }
        }

        if force || now_ms.saturating_sub(self.fuel.last_send_ms) >= STATUS_INTERVAL_MS {
            let _ = messages.push(IceCommandLong::fuel_level(
                STATUS_INDEX,
                self.fuel.level_or_invalid(),
            ));
            self.fuel.last_send_ms = now_ms;
        }

        messages
    }
}

fn is_equal(a: f32, b: f32) -> bool {
    fabsf(a - b) < f32::EPSILON
}
