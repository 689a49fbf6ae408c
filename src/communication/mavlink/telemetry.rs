//! Outbound ICE status messages
//!
//! The engine status is reported as COMMAND_LONG emissions carrying three
//! logical messages: coolant temperature, transmission state and fuel
//! level. These commands belong to a private dialect, so they are carried
//! by a local struct with command ids in the MAV_CMD_USER range; the host's
//! router maps them onto its dialect when framing.

/// Coolant temperature report (MAV_CMD_USER_1)
pub const MAV_CMD_ICE_COOLANT_TEMP: u16 = 31010;
/// Transmission state report (MAV_CMD_USER_2)
pub const MAV_CMD_ICE_TRANSMISSION_STATE: u16 = 31011;
/// Fuel level report (MAV_CMD_USER_3)
pub const MAV_CMD_ICE_FUEL_LEVEL: u16 = 31012;
/// Inbound transmission command (MAV_CMD_USER_4)
pub const MAV_CMD_ICE_SET_TRANSMISSION_STATE: u16 = 31013;

/// Fuel type reported in the fuel level message
pub const ICE_FUEL_TYPE_GASOLINE: f32 = 1.0;
/// Units reported in the fuel level message
pub const ICE_FUEL_UNITS_PERCENT: f32 = 1.0;

/// A COMMAND_LONG-shaped message in the private ICE dialect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceCommandLong {
    pub command: u16,
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub param5: f32,
    pub param6: f32,
    pub param7: f32,
}

impl IceCommandLong {
    fn new(command: u16) -> Self {
        Self {
            command,
            param1: 0.0,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
            param5: 0.0,
            param6: 0.0,
            param7: 0.0,
        }
    }

    /// Coolant temperature report: `(index, temp, too-hot limit, too-cold limit)`
    pub fn coolant_temp(index: u8, temperature: f32, temp_max: f32, temp_min: f32) -> Self {
        let mut msg = Self::new(MAV_CMD_ICE_COOLANT_TEMP);
        msg.param1 = index as f32;
        msg.param2 = temperature;
        msg.param3 = temp_max;
        msg.param4 = temp_min;
        msg
    }

    /// Transmission state report: `(index, gear, current pwm, ignition intent)`
    pub fn transmission_state(index: u8, gear: u8, current_pwm: u16, ignition: u8) -> Self {
        let mut msg = Self::new(MAV_CMD_ICE_TRANSMISSION_STATE);
        msg.param1 = index as f32;
        msg.param2 = gear as f32;
        msg.param3 = current_pwm as f32;
        msg.param4 = ignition as f32;
        msg
    }

    /// Fuel level report: `(index, type, units, max, level)`
    pub fn fuel_level(index: u8, level: f32) -> Self {
        let mut msg = Self::new(MAV_CMD_ICE_FUEL_LEVEL);
        msg.param1 = index as f32;
        msg.param2 = ICE_FUEL_TYPE_GASOLINE;
        msg.param3 = ICE_FUEL_UNITS_PERCENT;
        msg.param4 = 100.0;
        msg.param5 = level;
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolant_temp_layout() {
        let msg = IceCommandLong::coolant_temp(0, 85.5, 105.0, 10.0);
        assert_eq!(msg.command, MAV_CMD_ICE_COOLANT_TEMP);
        assert_eq!(msg.param1, 0.0);
        assert_eq!(msg.param2, 85.5);
        assert_eq!(msg.param3, 105.0);
        assert_eq!(msg.param4, 10.0);
    }

    #[test]
    fn test_transmission_state_layout() {
        let msg = IceCommandLong::transmission_state(0, 5, 1425, 2);
        assert_eq!(msg.command, MAV_CMD_ICE_TRANSMISSION_STATE);
        assert_eq!(msg.param2, 5.0);
        assert_eq!(msg.param3, 1425.0);
        assert_eq!(msg.param4, 2.0);
    }

    #[test]
    fn test_fuel_level_layout() {
        let msg = IceCommandLong::fuel_level(0, 42.0);
        assert_eq!(msg.command, MAV_CMD_ICE_FUEL_LEVEL);
        assert_eq!(msg.param2, ICE_FUEL_TYPE_GASOLINE);
        assert_eq!(msg.param3, ICE_FUEL_UNITS_PERCENT);
        assert_eq!(msg.param4, 100.0);
        assert_eq!(msg.param5, 42.0);
    }
}
