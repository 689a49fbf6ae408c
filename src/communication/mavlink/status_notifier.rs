//! MAVLink STATUSTEXT Notification Queue
//!
//! Collects the controller's operator-facing status messages (engine
//! events, gear changes, command rejections) for the host's MAVLink router
//! to drain into STATUSTEXT frames.
//!
//! # Architecture
//!
//! - **Owned queue**: the controller owns its notifier; no global state
//! - **Heapless**: fixed-capacity queue (16 messages) for no_std compatibility
//! - **Severity API**: dedicated methods per severity level
//!
//! Messages longer than the capacity are truncated; when the queue is full
//! the oldest message is dropped and counted.

use core::fmt::{self, Write};

use heapless::{Deque, String};
use mavlink::common::MavSeverity;

/// Maximum message length
const MAX_MESSAGE_LEN: usize = 100;

/// Queue capacity
const QUEUE_CAPACITY: usize = 16;

/// Queued STATUSTEXT message with severity and text
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub severity: MavSeverity,
    pub text: String<MAX_MESSAGE_LEN>,
}

/// Queue of pending STATUSTEXT messages
#[derive(Debug, Default)]
pub struct StatusNotifier {
    queue: Deque<StatusMessage, QUEUE_CAPACITY>,
    dropped_count: u32,
}

impl StatusNotifier {
    /// Create an empty notifier
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped_count: 0,
        }
    }

    /// Enqueue an INFO message
    pub fn info(&mut self, args: fmt::Arguments<'_>) {
        self.enqueue(MavSeverity::MAV_SEVERITY_INFO, args);
    }

    /// Enqueue a WARNING message
    pub fn warning(&mut self, args: fmt::Arguments<'_>) {
        self.enqueue(MavSeverity::MAV_SEVERITY_WARNING, args);
    }

    /// Pop the oldest pending message
    pub fn pop(&mut self) -> Option<StatusMessage> {
        self.queue.pop_front()
    }

    /// Number of pending messages
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no messages are pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Messages dropped because the queue was full
    pub fn dropped_count(&self) -> u32 {
        self.dropped_count
    }

    fn enqueue(&mut self, severity: MavSeverity, args: fmt::Arguments<'_>) {
        let mut text: String<MAX_MESSAGE_LEN> = String::new();
        // a full buffer truncates the message, which is fine for statustext
        let _ = text.write_fmt(args);

        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped_count += 1;
        }
        // cannot fail: one slot was just freed if needed
        let _ = self.queue.push_back(StatusMessage { severity, text });
    }
}
