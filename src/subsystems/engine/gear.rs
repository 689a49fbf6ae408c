//! Transmission state machine
//!
//! A physical gear change is a two-phase timed operation: first a dwell
//! waiting for the vehicle to come to rest, then the servo moves and we
//! wait out the mechanical travel time. The gear servo PWM only changes at
//! the stop-wait/shift boundary, never while the vehicle may still be
//! moving.

use crate::parameters::{GearPwmTable, IceParams};

/// Emitted on the gear channel while no gear servo is assigned
pub const GEAR_PWM_INVALID: u16 = 0;

/// Matching margin when classifying a PWM readback into a gear (μs)
const GEAR_PWM_MARGIN: u16 = 20;

/// Transmission gear state
///
/// Wire values are carried in the private ICE transmission messages and in
/// MAV_CMD_DO_ENGINE_CONTROL's gear parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearState {
    Unknown = 0,
    Park = 1,
    Reverse = 2,
    /// Reverse 1, for multi-gear transmissions; folded into [`GearState::Reverse`]
    Reverse1 = 3,
    Neutral = 4,
    Forward = 5,
    /// First gear; folded into [`GearState::Forward`]
    Forward1 = 6,
    Forward2 = 7,
    /// Explicit PWM request rather than a named gear
    PwmValue = 8,
}

impl GearState {
    /// Decode a wire value (command parameter)
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(GearState::Unknown),
            1 => Some(GearState::Park),
            2 => Some(GearState::Reverse),
            3 => Some(GearState::Reverse1),
            4 => Some(GearState::Neutral),
            5 => Some(GearState::Forward),
            6 => Some(GearState::Forward1),
            7 => Some(GearState::Forward2),
            8 => Some(GearState::PwmValue),
            _ => None,
        }
    }

    /// Wire value for telemetry
    pub fn wire_value(self) -> u8 {
        self as u8
    }

    /// Fold multi-gear aliases into their base gear
    pub fn normalized(self) -> Self {
        match self {
            GearState::Reverse1 => GearState::Reverse,
            GearState::Forward1 => GearState::Forward,
            other => other,
        }
    }

    /// Physical lever position used for shift-distance timing
    ///
    /// PWM_VALUE and UNKNOWN carry no position.
    pub fn position(self) -> i8 {
        match self {
            GearState::Park => 1,
            GearState::Reverse | GearState::Reverse1 => 2,
            GearState::Neutral => 3,
            GearState::Forward | GearState::Forward1 => 4,
            GearState::Forward2 => 5,
            GearState::Unknown | GearState::PwmValue => 0,
        }
    }

    /// Largest lever position, used when re-targeting mid-shift
    pub const fn position_max() -> i8 {
        5
    }

    /// Whether this is any forward gear
    pub fn is_forward(self) -> bool {
        matches!(
            self,
            GearState::Forward | GearState::Forward1 | GearState::Forward2
        )
    }

    /// Operator-facing name
    pub fn name(self) -> &'static str {
        match self {
            GearState::Park => "Park",
            GearState::Reverse | GearState::Reverse1 => "Reverse",
            GearState::Neutral => "Neutral",
            GearState::Forward | GearState::Forward1 => "Forward",
            GearState::Forward2 => "Forward High",
            GearState::Unknown | GearState::PwmValue => "Unknown",
        }
    }
}

/// Phase of an in-flight gear change
///
/// Exactly one phase is active at a time; the servo PWM commits at the
/// StopWait -> Shift boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingChange {
    /// No change in flight
    Idle,
    /// Waiting for the vehicle to come to rest before moving the servo
    StopWait {
        since_ms: u64,
        target_state: GearState,
        target_pwm: u16,
        total_shift_ms: u64,
    },
    /// Servo commanded, waiting out the mechanical travel time
    Shift { since_ms: u64, total_shift_ms: u64 },
}

impl PendingChange {
    /// Whether a change is in flight
    pub fn is_active(&self) -> bool {
        !matches!(self, PendingChange::Idle)
    }

    /// Target of an in-flight change, if any
    fn target(&self) -> Option<GearState> {
        match self {
            PendingChange::StopWait { target_state, .. } => Some(*target_state),
            _ => None,
        }
    }
}

/// Outcome of a gear change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GearRequest {
    /// Target already current or already pending; nothing to do
    Unchanged,
    /// Change accepted and the stop-wait phase begun
    Started {
        from: GearState,
        to: GearState,
        total_shift_ms: u64,
    },
    /// Unsupported target gear
    Rejected,
}

/// Event produced by the per-tick gear update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GearTick {
    None,
    /// Stop-wait elapsed; servo PWM committed, shift phase begun
    ShiftStarted,
    /// Shift time elapsed; the change is complete
    Completed(GearState),
}

/// Transmission state
#[derive(Debug)]
pub struct Gear {
    /// Current (or committing) gear
    pub(crate) state: GearState,
    /// PWM currently emitted on the gear servo channel
    pub(crate) pwm_active: u16,
    pub(crate) pending: PendingChange,
    /// Last gear command came from an auto mission
    pub(crate) set_by_automission: bool,
    /// Telemetry rate-limit bookkeeping
    pub(crate) last_send_ms: u64,
}

impl Gear {
    pub(crate) const fn new() -> Self {
        Self {
            state: GearState::Unknown,
            pwm_active: GEAR_PWM_INVALID,
            pending: PendingChange::Idle,
            set_by_automission: false,
            last_send_ms: 0,
        }
    }

    /// Current gear
    pub fn state(&self) -> GearState {
        self.state
    }

    /// PWM emitted on the gear servo channel
    pub fn active_pwm(&self) -> u16 {
        self.pwm_active
    }

    /// Whether a change is in flight
    pub fn change_in_flight(&self) -> bool {
        self.pending.is_active()
    }

    /// Abandon any in-flight change
    pub(crate) fn cancel_pending(&mut self) {
        self.pending = PendingChange::Idle;
    }

    /// Request a change to `target`
    ///
    /// `explicit_pwm` is only used with [`GearState::PwmValue`]. The servo
    /// PWM is not touched here; it commits when the stop-wait phase
    /// completes.
    pub(crate) fn request(
        &mut self,
        target: GearState,
        explicit_pwm: u16,
        params: &IceParams,
        now_ms: u64,
    ) -> GearRequest {
        let table = &params.gear_pwm;
        let (target, target_pwm) = match target {
            GearState::Park => (
                GearState::Park,
                constrain_pwm_with_direction(self.pwm_active, table.park_down, table.park_up),
            ),
            GearState::Reverse | GearState::Reverse1 => (
                GearState::Reverse,
                constrain_pwm_with_direction(self.pwm_active, table.reverse_down, table.reverse_up),
            ),
            GearState::Neutral => (
                GearState::Neutral,
                constrain_pwm_with_direction(self.pwm_active, table.neutral_down, table.neutral_up),
            ),
            GearState::Forward | GearState::Forward1 => (
                GearState::Forward,
                constrain_pwm_with_direction(
                    self.pwm_active,
                    table.forward1_down,
                    table.forward1_up,
                ),
            ),
            GearState::Forward2 => (
                GearState::Forward2,
                constrain_pwm_with_direction(
                    self.pwm_active,
                    table.forward2_down,
                    table.forward2_up,
                ),
            ),
            GearState::PwmValue => (GearState::PwmValue, explicit_pwm),
            GearState::Unknown => return GearRequest::Rejected,
        };

        if target != GearState::PwmValue
            && (self.state == target || self.pending.target() == Some(target))
        {
            // already there, or already heading there
            return GearRequest::Unchanged;
        }

        let total_steps = if !self.pending.is_active() {
            let distance = (self.state.position() - target.position()).unsigned_abs() as u64;
            distance.max(1)
        } else {
            // re-targeting mid-change: the lever position is uncertain, so
            // assume the worst-case travel
            GearState::position_max() as u64
        };
        let total_shift_ms = params.gear_duration_per_position_ms() * total_steps;

        let from = self.state;
        self.pending = PendingChange::StopWait {
            since_ms: now_ms,
            target_state: target,
            target_pwm,
            total_shift_ms,
        };

        GearRequest::Started {
            from,
            to: target,
            total_shift_ms,
        }
    }

    /// Advance an in-flight change
    pub(crate) fn tick(&mut self, params: &IceParams, now_ms: u64) -> GearTick {
        match self.pending {
            PendingChange::StopWait {
                since_ms,
                target_state,
                target_pwm,
                total_shift_ms,
            } => {
                if now_ms.saturating_sub(since_ms) >= params.gear_stop_ms() {
                    // vehicle had its chance to stop; move the servo now
                    self.pwm_active = target_pwm;
                    self.state = target_state;
                    self.pending = PendingChange::Shift {
                        since_ms: now_ms,
                        total_shift_ms,
                    };
                    GearTick::ShiftStarted
                } else {
                    GearTick::None
                }
            }
            PendingChange::Shift {
                since_ms,
                total_shift_ms,
            } => {
                if now_ms.saturating_sub(since_ms) >= total_shift_ms {
                    self.pending = PendingChange::Idle;
                    GearTick::Completed(self.state)
                } else {
                    GearTick::None
                }
            }
            PendingChange::Idle => GearTick::None,
        }
    }

    /// Classify a servo PWM readback into a gear state
    ///
    /// Used at boot to recover the physical gear from the servo trim. Each
    /// gear's `(down, up)` band matches with a ±20 μs margin; higher gears
    /// win ties, anything unmatched is PARK.
    pub(crate) fn classify_pwm(pwm: u16, table: &GearPwmTable) -> GearState {
        if in_band(pwm, table.forward2_down, table.forward2_up) {
            GearState::Forward2
        } else if in_band(pwm, table.forward1_down, table.forward1_up) {
            GearState::Forward
        } else if in_band(pwm, table.neutral_down, table.neutral_up) {
            GearState::Neutral
        } else if in_band(pwm, table.reverse_down, table.reverse_up) {
            GearState::Reverse
        } else {
            GearState::Park
        }
    }
}

/// Pick the hysteresis PWM for the approach direction
///
/// Approaching from above uses the `down` value, from below the `up`
/// value; sitting on the midpoint leaves the output unchanged.
fn constrain_pwm_with_direction(initial: u16, pwm_going_down: u16, pwm_going_up: u16) -> u16 {
    let desired = (pwm_going_down + pwm_going_up) / 2;
    if initial == desired {
        initial
    } else if initial > desired {
        pwm_going_down
    } else {
        pwm_going_up
    }
}

fn in_band(pwm: u16, down: u16, up: u16) -> bool {
    let lo = down.min(up).saturating_sub(GEAR_PWM_MARGIN);
    let hi = down.max(up).saturating_add(GEAR_PWM_MARGIN);
    (lo..=hi).contains(&pwm)
}
