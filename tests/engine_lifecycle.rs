//! End-to-end engine lifecycle scenarios
//!
//! Drives the controller tick by tick through the full start/run/fail
//! sequences using the host mocks, checking states, outputs and telemetry
//! along the way.

use ice_engine::core::traits::{MockTime, TimeSource};
use ice_engine::libraries::rc_channel::RcInput;
use ice_engine::libraries::rpm::MockRpm;
use ice_engine::libraries::srv_channel::{SrvChannelConfig, SrvChannels, SrvFunction};
use ice_engine::parameters::{IceOptions, IceParams, VehicleClass};
use ice_engine::platform::mock::MockAnalog;
use ice_engine::subsystems::engine::{
    EngineController, EngineIo, EngineState, GearState, IgnitionState,
};

const IGNITION_ON: u16 = 1900;
const IGNITION_OFF: u16 = 1500; // trim
const STARTER_ON: u16 = 1900;

struct Bench {
    rc: RcInput,
    srv: SrvChannels,
    rpm: MockRpm,
    analog: MockAnalog,
    armed: bool,
}

impl Bench {
    /// Servo table: defaults for ignition/starter/throttle, gear trim at
    /// the PARK band so boot detection lands in PARK.
    fn new() -> Self {
        let mut srv = SrvChannels::new();
        srv.assign(SrvFunction::Ignition, SrvChannelConfig::default());
        srv.assign(SrvFunction::Starter, SrvChannelConfig::default());
        srv.assign(SrvFunction::Throttle, SrvChannelConfig::default());
        srv.assign(
            SrvFunction::EngineGear,
            SrvChannelConfig {
                min_pwm: 1000,
                trim_pwm: 1000,
                max_pwm: 1900,
            },
        );
        Self {
            rc: RcInput::new(),
            srv,
            rpm: MockRpm::new(),
            analog: MockAnalog::new(),
            armed: true,
        }
    }

    fn tick(&mut self, ctrl: &mut EngineController<&MockTime>) {
        let mut io = EngineIo {
            rc: &mut self.rc,
            srv: &mut self.srv,
            master_enable: None,
            analog: Some(&mut self.analog),
            rpm: Some(&self.rpm),
            battery: None,
            position: None,
            armed: self.armed,
        };
        ctrl.update(&mut io);
    }

    fn ignition_pwm(&self) -> u16 {
        self.srv.get_output_pwm(SrvFunction::Ignition).unwrap()
    }

    fn starter_pwm(&self) -> u16 {
        self.srv.get_output_pwm(SrvFunction::Starter).unwrap()
    }
}

fn base_params() -> IceParams {
    let mut params = IceParams::default();
    params.enable = true;
    params.start_chan = 1;
    params.starter_time = 3.0;
    params.start_delay = 2.0;
    params
}

fn drain_texts(ctrl: &mut EngineController<&MockTime>) -> Vec<String> {
    std::iter::from_fn(|| ctrl.pop_status_text())
        .map(|m| m.text.as_str().to_owned())
        .collect()
}

/// S1: clean start with early RPM confirmation
#[test]
fn scenario_clean_start() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut params = base_params();
    params.rpm_instance = 1;
    params.rpm_threshold_running = 500;
    params.rpm_threshold_starting = 300;
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, params);

    bench.rc.set_radio_in(1, 1800);

    // t=0: intent resolves to START_RUN, OFF -> START_DELAY
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.ignition_state(), IgnitionState::StartRun);
    assert_eq!(ctrl.state(), EngineState::StartDelay);
    assert_eq!(bench.ignition_pwm(), IGNITION_ON);
    assert_ne!(bench.starter_pwm(), STARTER_ON);

    // t=2s, no prior attempt: starter engages
    time.set_ms(2000);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::Starting);
    assert_eq!(ctrl.starting_attempts(), 1);
    assert_eq!(bench.ignition_pwm(), IGNITION_ON);
    assert_eq!(bench.starter_pwm(), STARTER_ON);

    // t=2.5s: rpm 350 crosses RPM_THRESH2 -> RUNNING
    time.set_ms(2500);
    bench.rpm.set_rpm(Some(350.0));
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::Running);
    assert_eq!(bench.ignition_pwm(), IGNITION_ON);
    assert_ne!(bench.starter_pwm(), STARTER_ON);

    let texts = drain_texts(&mut ctrl);
    assert!(texts.iter().any(|t| t.contains("Engine running")));
}

/// S2: failed starts bounded by the restart budget
#[test]
fn scenario_failed_start_retry_budget() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut params = base_params();
    params.rpm_instance = 1;
    params.rpm_threshold_running = 500;
    params.rpm_threshold_starting = 300;
    params.restarts_allowed = 1;
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, params);

    bench.rc.set_radio_in(1, 1800);
    bench.rpm.set_rpm(Some(0.0));

    let mut starter_engagements = 0u32;
    let mut starter_was_on = false;
    for ms in (0..60_000u64).step_by(100) {
        time.set_ms(ms);
        bench.tick(&mut ctrl);

        // invariants: starter high only in STARTING, ignition reflects state
        let starter_on = bench.starter_pwm() == STARTER_ON;
        assert_eq!(starter_on, ctrl.state() == EngineState::Starting);
        match ctrl.state() {
            EngineState::Off | EngineState::StartDelayNoIgnition => {
                assert_eq!(bench.ignition_pwm(), IGNITION_OFF)
            }
            _ => assert_eq!(bench.ignition_pwm(), IGNITION_ON),
        }

        if starter_on && !starter_was_on {
            starter_engagements += 1;
        }
        starter_was_on = starter_on;
    }

    // budget of 1 restart: exactly two engagements, then linger
    assert_eq!(starter_engagements, 2);
    assert_eq!(ctrl.state(), EngineState::StartDelay);

    // only the OFF switch clears the budget
    bench.rc.set_radio_in(1, 1000);
    time.set_ms(61_000);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::Off);
    assert_eq!(ctrl.starting_attempts(), 0);
}

fn run_engine_to_running(
    time: &MockTime,
    bench: &mut Bench,
    ctrl: &mut EngineController<&MockTime>,
) {
    bench.rc.set_radio_in(1, 1800);
    bench.tick(ctrl);
    time.advance_ms(100);
    bench.tick(ctrl);
    assert_eq!(ctrl.state(), EngineState::Starting);
    time.advance_ms(3100);
    bench.tick(ctrl);
    assert_eq!(ctrl.state(), EngineState::Running);
}

/// S3: overheat derates the requested throttle
#[test]
fn scenario_overheat_derate() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut params = base_params();
    params.temp_pin = 13;
    params.temp_scaler = 100.0;
    params.temp_offset = 0.0;
    params.temp_max = 100.0;
    params.temp_min = 0.0;
    params.temp_hot_throttle_factor = 0.25;
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, params);

    bench.analog.set_voltage(1.1); // 110 degC
    run_engine_to_running(&time, &mut bench, &mut ctrl);
    assert!(ctrl.get_temperature().unwrap() > 100.0);

    let mut throttle = 80.0;
    assert!(ctrl.throttle_override(&mut throttle, &bench.srv));
    assert_eq!(throttle, 20.0);
}

/// S4: too cold floors the throttle at idle
#[test]
fn scenario_cold_idle() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut params = base_params();
    params.temp_pin = 13;
    params.temp_scaler = 100.0;
    params.temp_offset = 0.0;
    params.temp_min = 10.0;
    params.temp_max = 0.0;
    params.idle_percent = 15;
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, params);

    bench.analog.set_voltage(0.05); // 5 degC
    run_engine_to_running(&time, &mut bench, &mut ctrl);

    bench.srv.set_output_scaled(SrvFunction::Throttle, 5.0);
    let mut throttle = 5.0;
    assert!(ctrl.throttle_override(&mut throttle, &bench.srv));
    assert_eq!(throttle, 15.0);
}

/// S5: two-phase gear change timing with brake hold
#[test]
fn scenario_gear_shift_timing() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut params = base_params();
    params.gear_stop_duration = 1.0;
    params.gear_change_duration_per_position = 1.5;
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, params);

    // boot: gear servo trim (1000) classifies as PARK
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.gear().state(), GearState::Park);
    let park_pwm = ctrl.gear().active_pwm();

    // t=0: request FORWARD; 3 positions at 1.5 s each
    assert!(ctrl.set_gear(GearState::Forward, 0));
    let texts = drain_texts(&mut ctrl);
    assert!(texts
        .iter()
        .any(|t| t.contains("Gear change: Park to Forward in 4.5s")));

    // stop-wait: PWM unchanged, brake forced
    time.set_ms(500);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.gear().active_pwm(), park_pwm);
    assert_eq!(ctrl.gear().state(), GearState::Park);
    let mut brake = 0.0;
    assert!(ctrl.brake_override(&mut brake, 5.0, true, 2.0, true));
    assert_eq!(brake, 100.0);

    // t=1s: PWM jumps to the forward value, shift phase begins
    time.set_ms(1000);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.gear().state(), GearState::Forward);
    assert_eq!(ctrl.gear().active_pwm(), 1425);
    assert_eq!(
        bench.srv.get_output_pwm(SrvFunction::EngineGear),
        Some(1425)
    );
    assert!(ctrl.gear().change_in_flight());

    // still shifting until t=5.5s
    time.set_ms(5400);
    bench.tick(&mut ctrl);
    assert!(ctrl.gear().change_in_flight());
    let mut brake = 0.0;
    assert!(ctrl.brake_override(&mut brake, 5.0, true, 2.0, true));
    assert_eq!(brake, 100.0);

    // t=5.5s: complete
    time.set_ms(5500);
    bench.tick(&mut ctrl);
    assert!(!ctrl.gear().change_in_flight());
    let texts = drain_texts(&mut ctrl);
    assert!(texts.iter().any(|t| t.contains("Gear is now Forward")));
}

/// S6: running RPM dropout with the forced ignition-off dwell
#[test]
fn scenario_rpm_dropout_force_off() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut params = base_params();
    params.rpm_instance = 1;
    params.rpm_threshold_running = 500;
    params.rpm_threshold_starting = 300;
    params.options = IceOptions::RUNNING_FAIL_FORCE_STOP;
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, params);

    bench.rc.set_radio_in(1, 1800);
    bench.rpm.set_rpm(Some(800.0));
    bench.tick(&mut ctrl);
    time.advance_ms(100);
    bench.tick(&mut ctrl);
    time.advance_ms(100);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::Running);

    // rpm collapses
    let fail_at = time.now_ms();
    time.advance_ms(100);
    bench.rpm.set_rpm(Some(0.0));
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::StartDelayNoIgnition);
    assert_eq!(bench.ignition_pwm(), IGNITION_OFF);
    let texts = drain_texts(&mut ctrl);
    assert!(texts.iter().any(|t| t.contains("Engine died while running")));

    // the dwell holds ~3 s, then behaves as START_DELAY again
    time.set_ms(fail_at + 3000);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::StartDelayNoIgnition);

    time.set_ms(fail_at + 3200);
    bench.tick(&mut ctrl);
    assert_eq!(ctrl.state(), EngineState::StartDelay);
    assert_eq!(bench.ignition_pwm(), IGNITION_ON);
}

/// Telemetry reflects the state computed in the same tick
#[test]
fn telemetry_reports_gear_and_intent() {
    let time = MockTime::new();
    let mut bench = Bench::new();
    let mut ctrl = EngineController::new(&time, VehicleClass::Ground, base_params());

    bench.tick(&mut ctrl);
    bench.rc.set_radio_in(1, 1800);

    time.set_ms(1000);
    let mut io = EngineIo {
        rc: &mut bench.rc,
        srv: &mut bench.srv,
        master_enable: None,
        analog: Some(&mut bench.analog),
        rpm: Some(&bench.rpm),
        battery: None,
        position: None,
        armed: true,
    };
    let msgs = ctrl.update(&mut io);

    use ice_engine::communication::mavlink::telemetry::MAV_CMD_ICE_TRANSMISSION_STATE;
    let gear_msg = msgs
        .iter()
        .find(|m| m.command == MAV_CMD_ICE_TRANSMISSION_STATE)
        .expect("transmission state due at 1 Hz");
    assert_eq!(gear_msg.param2, GearState::Park.wire_value() as f32);
    assert_eq!(gear_msg.param4, IgnitionState::StartRun as u8 as f32);
}
