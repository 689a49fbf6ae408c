//! Engine Command Handler
//!
//! Handles COMMAND_LONG messages addressed to the engine controller.
//!
//! # Supported Commands
//!
//! - **MAV_CMD_DO_ENGINE_CONTROL**: start/stop the engine, optionally with
//!   a start height delay and a gear selection
//! - **MAV_CMD_ICE_SET_TRANSMISSION_STATE** (private dialect): select a
//!   gear or raw servo PWM, and the neutral brake-release flag
//!
//! # Command Flow
//!
//! 1. GCS or mission sends COMMAND_LONG
//! 2. The handler maps parameters onto controller calls
//! 3. The controller accepts or rejects (policy lives there, not here)
//! 4. The handler returns COMMAND_ACK with ACCEPTED/DENIED/UNSUPPORTED

use mavlink::common::{MavCmd, MavResult, COMMAND_ACK_DATA, COMMAND_LONG_DATA};

use crate::communication::mavlink::telemetry::{
    IceCommandLong, MAV_CMD_ICE_COOLANT_TEMP, MAV_CMD_ICE_FUEL_LEVEL,
    MAV_CMD_ICE_SET_TRANSMISSION_STATE, MAV_CMD_ICE_TRANSMISSION_STATE,
};
use crate::core::traits::TimeSource;
use crate::libraries::rc_channel::RcInput;
use crate::subsystems::engine::EngineController;

/// Command handler bridging the MAVLink router and the engine controller
///
/// Borrowed per dispatch; holds no state of its own.
pub struct EngineCommandHandler<'a, T: TimeSource> {
    controller: &'a mut EngineController<T>,
    rc: &'a RcInput,
}

impl<'a, T: TimeSource> EngineCommandHandler<'a, T> {
    /// Create a handler around the controller and the RC input state
    pub fn new(controller: &'a mut EngineController<T>, rc: &'a RcInput) -> Self {
        Self { controller, rc }
    }

    /// Handle a COMMAND_LONG message from GCS or mission
    ///
    /// Returns the COMMAND_ACK to send back.
    pub fn handle_command_long(&mut self, cmd: &COMMAND_LONG_DATA) -> COMMAND_ACK_DATA {
        crate::log_debug!("Engine command: {:?}", cmd.command);

        let result = match cmd.command {
            MavCmd::MAV_CMD_DO_ENGINE_CONTROL => self.handle_do_engine_control(cmd),
            _ => {
                crate::log_warn!("Unsupported engine command: {:?}", cmd.command);
                MavResult::MAV_RESULT_UNSUPPORTED
            }
        };

        COMMAND_ACK_DATA {
            command: cmd.command,
            result,
            ..Default::default()
        }
    }

    /// Handle MAV_CMD_DO_ENGINE_CONTROL
    ///
    /// param1: start control (0 off, 1 accessory, 2 start/run)
    /// param2: cold start flag (unused)
    /// param3: height delay (m), airborne vehicles only
    /// param4: transmission gear state
    fn handle_do_engine_control(&mut self, cmd: &COMMAND_LONG_DATA) -> MavResult {
        let accepted = self.controller.engine_control(
            cmd.param1 as i32,
            cmd.param2 as i32,
            cmd.param3,
            cmd.param4 as i32,
            false,
            self.rc,
        );
        if accepted {
            MavResult::MAV_RESULT_ACCEPTED
        } else {
            MavResult::MAV_RESULT_DENIED
        }
    }

    /// Handle a private-dialect ICE command
    ///
    /// The outbound status commands are rejected here; they only ever
    /// travel autopilot-to-GCS.
    pub fn handle_ice_command(&mut self, cmd: &IceCommandLong) -> MavResult {
        match cmd.command {
            MAV_CMD_ICE_SET_TRANSMISSION_STATE => {
                // param2 = gear, param3 = explicit PWM, param4 = brake release
                let accepted = self.controller.handle_set_transmission_state(
                    cmd.param2 as i32,
                    cmd.param3 as u16,
                    cmd.param4 != 0.0,
                );
                if accepted {
                    MavResult::MAV_RESULT_ACCEPTED
                } else {
                    MavResult::MAV_RESULT_DENIED
                }
            }

            MAV_CMD_ICE_COOLANT_TEMP | MAV_CMD_ICE_TRANSMISSION_STATE
            | MAV_CMD_ICE_FUEL_LEVEL => {
                // outbound-only status commands
                MavResult::MAV_RESULT_UNSUPPORTED
            }

            _ => MavResult::MAV_RESULT_UNSUPPORTED,
        }
    }
}
