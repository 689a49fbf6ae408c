//! Servo output channel registry
//!
//! Function-keyed output channels for the engine controller: ignition
//! relay, starter motor, transmission gear servo and throttle. Writes are
//! idempotent; the host pushes `output_pwm` values to the PWM hardware
//! after each tick.
//!
//! ## Safety
//!
//! The trim pulse width dictates the de-energized state for the ignition
//! and starter channels. `set_output_to_trim` is therefore the only safe
//! "off" write for those functions.

/// Output functions a channel can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrvFunction {
    /// Engine ignition relay
    Ignition,
    /// Starter motor relay
    Starter,
    /// Transmission gear servo
    EngineGear,
    /// Engine throttle
    Throttle,
}

impl SrvFunction {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            SrvFunction::Ignition => 0,
            SrvFunction::Starter => 1,
            SrvFunction::EngineGear => 2,
            SrvFunction::Throttle => 3,
        }
    }
}

/// Servo channel calibration (pulse widths in μs)
#[derive(Debug, Clone, Copy)]
pub struct SrvChannelConfig {
    pub min_pwm: u16,
    pub trim_pwm: u16,
    pub max_pwm: u16,
}

impl Default for SrvChannelConfig {
    fn default() -> Self {
        Self {
            min_pwm: 1100,
            trim_pwm: 1500,
            max_pwm: 1900,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SrvChannel {
    config: SrvChannelConfig,
    output_pwm: u16,
}

/// Function-keyed servo output registry
///
/// Mirrors the autopilot's servo output table: each engine-related function
/// may or may not have a channel assigned, and all writes go through the
/// function, not the channel number.
#[derive(Debug, Default)]
pub struct SrvChannels {
    channels: [Option<SrvChannel>; SrvFunction::COUNT],
}

impl SrvChannels {
    /// Create a registry with no functions assigned
    pub const fn new() -> Self {
        Self {
            channels: [None; SrvFunction::COUNT],
        }
    }

    /// Assign a channel to a function
    ///
    /// The channel boots at its trim value.
    pub fn assign(&mut self, function: SrvFunction, config: SrvChannelConfig) {
        self.channels[function.index()] = Some(SrvChannel {
            config,
            output_pwm: config.trim_pwm,
        });
    }

    /// Whether a channel is assigned to the function
    pub fn function_assigned(&self, function: SrvFunction) -> bool {
        self.channels[function.index()].is_some()
    }

    /// Set output as a percentage of the channel's range (0..100)
    ///
    /// 0 maps to `min_pwm`, 100 to `max_pwm`. Values outside the range are
    /// clamped. No-op when the function is unassigned.
    pub fn set_output_scaled(&mut self, function: SrvFunction, percent: f32) {
        if let Some(chan) = self.channels[function.index()].as_mut() {
            let pct = percent.clamp(0.0, 100.0);
            let span = (chan.config.max_pwm - chan.config.min_pwm) as f32;
            chan.output_pwm = chan.config.min_pwm + (span * pct / 100.0) as u16;
        }
    }

    /// Current output as a percentage of the channel's range
    pub fn get_output_scaled(&self, function: SrvFunction) -> Option<f32> {
        let chan = self.channels[function.index()].as_ref()?;
        let span = (chan.config.max_pwm - chan.config.min_pwm) as f32;
        if span <= 0.0 {
            return Some(0.0);
        }
        Some((chan.output_pwm.saturating_sub(chan.config.min_pwm)) as f32 * 100.0 / span)
    }

    /// Set a raw output pulse width (μs)
    ///
    /// No-op when the function is unassigned.
    pub fn set_output_pwm(&mut self, function: SrvFunction, pwm: u16) {
        if let Some(chan) = self.channels[function.index()].as_mut() {
            chan.output_pwm = pwm;
        }
    }

    /// Set the output to the channel's trim value
    pub fn set_output_to_trim(&mut self, function: SrvFunction) {
        if let Some(chan) = self.channels[function.index()].as_mut() {
            chan.output_pwm = chan.config.trim_pwm;
        }
    }

    /// Current output pulse width (μs)
    pub fn get_output_pwm(&self, function: SrvFunction) -> Option<u16> {
        self.channels[function.index()].map(|c| c.output_pwm)
    }

    /// Trim pulse width for the function's channel (μs)
    pub fn trim(&self, function: SrvFunction) -> Option<u16> {
        self.channels[function.index()].map(|c| c.config.trim_pwm)
    }

    /// Current output as a PWM duty cycle, for the host's PWM layer
    pub fn get_output_duty_cycle(&self, function: SrvFunction) -> Option<f32> {
        self.get_output_pwm(function).map(pulse_to_duty_cycle)
    }
}

/// Convert pulse width to PWM duty cycle
///
/// For 50 Hz PWM (20 ms period):
/// - 1000 μs = 5.0% duty cycle
/// - 1500 μs = 7.5% duty cycle
/// - 2000 μs = 10.0% duty cycle
pub fn pulse_to_duty_cycle(pulse_us: u16) -> f32 {
    // 50 Hz = 20,000 μs period
    const PERIOD_US: f32 = 20_000.0;
    pulse_us as f32 / PERIOD_US
}

/// Convert duty cycle to pulse width
///
/// Inverse of `pulse_to_duty_cycle`.
pub fn duty_cycle_to_pulse(duty: f32) -> u16 {
    const PERIOD_US: f32 = 20_000.0;
    (duty * PERIOD_US) as u16
}
