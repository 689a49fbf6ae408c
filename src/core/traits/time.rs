//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over different
//! time providers (Embassy, mock, etc.) to enable host testing without
//! embedded dependencies.

use core::cell::Cell;

/// Platform-agnostic time source for control loops and timing.
///
/// This trait abstracts over different time providers:
/// - an Embassy-backed clock on embedded targets (provided by the host)
/// - `MockTime` for host testing with controllable time
///
/// # Example
///
/// ```
/// use ice_engine::core::traits::{MockTime, TimeSource};
///
/// fn control_loop<T: TimeSource>(time: &T, last_update: &mut u64) {
///     let now = time.now_us();
///     let elapsed = time.elapsed_since(*last_update);
///     if elapsed >= 20_000 { // 50Hz
///         // Do control update
///         *last_update = now;
///     }
/// }
///
/// let time = MockTime::new();
/// let mut last = 0;
/// control_loop(&time, &mut last);
/// ```
pub trait TimeSource: Clone {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle potential overflow.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

// A borrowed time source is itself a time source. Lets tests hand the
// controller `&MockTime` while keeping the original to drive the clock.
impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (*self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (*self).now_us()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// This implementation allows tests to control time progression,
/// enabling deterministic testing of timing-dependent code.
///
/// # Example
///
/// ```
/// use ice_engine::core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.advance(1000); // Advance 1ms
/// assert_eq!(time.now_us(), 1000);
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Sets the current time in milliseconds.
    pub fn set_ms(&self, ms: u64) {
        self.current_us.set(ms * 1000);
    }

    /// Advances the current time by the specified milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
