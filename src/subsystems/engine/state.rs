//! Engine lifecycle and ignition intent states

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Ignition and starter de-energized, restart counter cleared
    Off,
    /// Ignition on, waiting for start conditions and the inter-attempt dwell
    StartDelay,
    /// Like Off, but keeps the restart counter; used after a running-RPM
    /// failure to guarantee the ignition actually drops before a retry
    StartDelayNoIgnition,
    /// Waiting to climb a commanded height before starting (airborne only)
    StartHeightDelay,
    /// Starter engaged
    Starting,
    /// Engine confirmed (or assumed) running
    Running,
}

impl EngineState {
    /// Operator-facing name
    pub fn name(self) -> &'static str {
        match self {
            EngineState::Off => "Off",
            EngineState::StartDelay => "Start delay",
            EngineState::StartDelayNoIgnition => "Start delay (no ignition)",
            EngineState::StartHeightDelay => "Start height delay",
            EngineState::Starting => "Starting",
            EngineState::Running => "Running",
        }
    }
}

/// Desired ignition position, from the pilot switch or auto-mission
///
/// Wire values match MAV_CMD_DO_ENGINE_CONTROL's start_control parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnitionState {
    /// Everything de-energized
    Off = 0,
    /// Ignition/accessory power only, no auto starting
    Accessory = 1,
    /// Accessory power plus permission to auto-start
    StartRun = 2,
}

impl IgnitionState {
    /// Decode a 3-position switch from its pulse width
    ///
    /// low = off, mid = accessory/run only, high = accessory/run + allow
    /// auto starting.
    pub fn from_pwm(pwm: u16) -> Self {
        if pwm <= 1300 {
            IgnitionState::Off
        } else if pwm >= 1700 {
            IgnitionState::StartRun
        } else {
            IgnitionState::Accessory
        }
    }

    /// Decode MAV_CMD_DO_ENGINE_CONTROL's start_control value
    pub fn from_start_control(value: i32) -> Option<Self> {
        match value {
            0 => Some(IgnitionState::Off),
            1 => Some(IgnitionState::Accessory),
            2 => Some(IgnitionState::StartRun),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignition_pwm_buckets() {
        assert_eq!(IgnitionState::from_pwm(900), IgnitionState::Off);
        assert_eq!(IgnitionState::from_pwm(1300), IgnitionState::Off);
        assert_eq!(IgnitionState::from_pwm(1301), IgnitionState::Accessory);
        assert_eq!(IgnitionState::from_pwm(1500), IgnitionState::Accessory);
        assert_eq!(IgnitionState::from_pwm(1699), IgnitionState::Accessory);
        assert_eq!(IgnitionState::from_pwm(1700), IgnitionState::StartRun);
        assert_eq!(IgnitionState::from_pwm(2100), IgnitionState::StartRun);
    }

    #[test]
    fn test_start_control_decode() {
        assert_eq!(
            IgnitionState::from_start_control(0),
            Some(IgnitionState::Off)
        );
        assert_eq!(
            IgnitionState::from_start_control(1),
            Some(IgnitionState::Accessory)
        );
        assert_eq!(
            IgnitionState::from_start_control(2),
            Some(IgnitionState::StartRun)
        );
        assert_eq!(IgnitionState::from_start_control(3), None);
        assert_eq!(IgnitionState::from_start_control(-1), None);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(EngineState::Off.name(), "Off");
        assert_eq!(EngineState::Running.name(), "Running");
    }
}
