//! In-order receive-side state machine.
//!
//! [`SequencedReceiver`] implements the server side of the data phase:
//!
//! - Only **in-order** segments are accepted (`seq == next_expected`).
//! - Out-of-order segments (a gap exists) are silently discarded — no ACK is
//!   sent, so recovery relies entirely on the sender's timeout.
//! - Segments below the cursor (duplicates of already-accepted data) get the
//!   same treatment: silent discard, no re-ACK.
//! - Every accepted segment advances the cursor by one and is acknowledged
//!   cumulatively with `ack = next_expected`.
//! - Before accepting, the injectable [`DropPolicy`](crate::fault::DropPolicy)
//!   is consulted; a dropped segment leaves all state untouched.
//!
//! This module only manages state; the server driver performs the file write
//! and the ACK transmission based on the returned [`Verdict`].

use std::time::{Duration, Instant};

use crate::fault::DropPolicy;

/// Outcome of processing one inbound data segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// In-order segment accepted: write the payload, then send an ACK
    /// carrying this acknowledgment number.
    Deliver { ack: u16 },
    /// The fault policy discarded this segment.  No write, no ACK.
    Dropped,
    /// `seq` is ahead of the cursor (a gap exists).  No write, no ACK.
    OutOfOrder,
    /// `seq` is behind the cursor (already accepted).  No write, no ACK.
    Duplicate,
}

/// Receive-side state for one connection.
pub struct SequencedReceiver {
    /// Next expected sequence number.  Starts at 1, never decreases.
    next_expected: u16,
    /// Fault-injection hook consulted per in-order segment.
    policy: Box<dyn DropPolicy>,
    /// Total accepted payload bytes.
    total_bytes: u64,
    /// Time of the first accepted segment (throughput clock start).
    started_at: Option<Instant>,
}

impl SequencedReceiver {
    pub fn new(policy: Box<dyn DropPolicy>) -> Self {
        Self {
            next_expected: 1,
            policy,
            total_bytes: 0,
            started_at: None,
        }
    }

    /// Next expected sequence number (the value the next ACK will carry
    /// after an acceptance).
    pub fn next_expected(&self) -> u16 {
        self.next_expected
    }

    /// Total accepted payload bytes so far.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Process one inbound data segment and return what to do with it.
    pub fn on_segment(&mut self, seq: u16, payload: &[u8]) -> Verdict {
        if seq == self.next_expected {
            if self.policy.should_drop(seq) {
                return Verdict::Dropped;
            }
            self.started_at.get_or_insert_with(Instant::now);
            self.total_bytes += payload.len() as u64;
            self.next_expected = self.next_expected.wrapping_add(1);
            Verdict::Deliver {
                ack: self.next_expected,
            }
        } else if seq > self.next_expected {
            Verdict::OutOfOrder
        } else {
            Verdict::Duplicate
        }
    }

    /// Accepted bytes and elapsed time since the first accepted segment.
    pub fn stats(&self) -> ReceiveStats {
        ReceiveStats {
            bytes: self.total_bytes,
            elapsed: self
                .started_at
                .map(|t| t.elapsed())
                .unwrap_or(Duration::ZERO),
        }
    }
}

/// Throughput accounting reported at connection close.
#[derive(Debug, Clone, Copy)]
pub struct ReceiveStats {
    /// Total accepted payload bytes.
    pub bytes: u64,
    /// Wall-clock time from the first accepted segment to connection close.
    pub elapsed: Duration,
}

impl ReceiveStats {
    /// Throughput in megabits per second.
    pub fn throughput_mbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        (self.bytes as f64 * 8.0) / secs / 1e6
    }
}
