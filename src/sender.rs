//! Sliding-window send-side state machine.
//!
//! [`WindowSender`] maintains the client's window of up to `W` in-flight
//! data segments.  Sequence numbers are per-segment (not per-byte): the
//! first data segment is seq 1 and each subsequent segment increments by
//! one.
//!
//! # Protocol contract
//!
//! - At most `window_size` segments may be in flight at once.
//! - An ACK carrying `ack` retires **exactly** the window entry with
//!   sequence number `ack − 1`.  Retirement is exact-match, not range-based;
//!   lower-numbered entries stay in flight until their own ACK arrives.
//! - On timeout, the caller retransmits every entry older than the
//!   retransmission timeout, byte-identical and with its original sequence
//!   number (Go-Back-N, not selective repeat).
//!
//! This module only manages state; all socket and file I/O is the caller's
//! responsibility.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::packet::Packet;

/// A single in-flight segment occupying one slot in the retransmit window.
#[derive(Debug, Clone)]
pub struct InFlight {
    /// The exact segment that went on the wire (kept for retransmission).
    pub packet: Packet,
    /// Wall-clock time of the most recent transmission.
    pub sent_at: Instant,
}

/// Send-side window state for one connection.
///
/// ```text
///        window (≤ W entries)      next_seq
///  ──┬────┬────┬────┬──────────────┼───────▶ seq space
///    │ in flight, oldest first     │ next new segment
/// ```
#[derive(Debug)]
pub struct WindowSender {
    /// Sequence number for the next new data segment.  Starts at 1.
    next_seq: u16,
    /// Maximum number of in-flight segments (W ≥ 1).
    window_size: usize,
    /// In-flight segments ordered by sequence number (front = oldest).
    window: VecDeque<InFlight>,
}

impl WindowSender {
    /// Create a new [`WindowSender`] with window size `window_size`.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is zero; configuration validation rejects
    /// that long before a sender is built.
    pub fn new(window_size: usize) -> Self {
        assert!(window_size >= 1, "window_size must be at least 1");
        Self {
            next_seq: 1,
            window_size,
            window: VecDeque::with_capacity(window_size),
        }
    }

    /// `true` when there is room for at least one more in-flight segment.
    pub fn can_send(&self) -> bool {
        self.window.len() < self.window_size
    }

    /// Number of segments currently awaiting acknowledgement.
    pub fn in_flight(&self) -> usize {
        self.window.len()
    }

    /// `true` when at least one segment is awaiting acknowledgement.
    pub fn has_unacked(&self) -> bool {
        !self.window.is_empty()
    }

    /// Sequence number the next new segment will carry.
    pub fn next_seq(&self) -> u16 {
        self.next_seq
    }

    /// In-flight sequence numbers, oldest first (for logging).
    pub fn seqs(&self) -> Vec<u16> {
        self.window.iter().map(|e| e.packet.header.seq).collect()
    }

    /// Build a data segment carrying `payload` with the next sequence number.
    ///
    /// Call [`record_sent`](Self::record_sent) immediately after transmission
    /// to place the segment into the window and advance `next_seq`.
    pub fn build_data_packet(&self, payload: Vec<u8>) -> Packet {
        Packet::data(self.next_seq, payload)
    }

    /// Place a just-transmitted segment into the window and advance `next_seq`.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if the window is already full.  Check
    /// [`can_send`](Self::can_send) before calling.
    pub fn record_sent(&mut self, packet: Packet) {
        debug_assert!(
            self.can_send(),
            "record_sent called on a full window ({} / {})",
            self.window.len(),
            self.window_size
        );
        self.window.push_back(InFlight {
            packet,
            sent_at: Instant::now(),
        });
        self.next_seq = self.next_seq.wrapping_add(1);
    }

    /// Process an ACK carrying acknowledgment number `ack`.
    ///
    /// Retires exactly the window entry with sequence `ack − 1`, if present,
    /// and returns its sequence number.  Returns `None` for an ACK that
    /// matches nothing in the window (duplicate or stale).
    pub fn on_ack(&mut self, ack: u16) -> Option<u16> {
        let acked_seq = ack.wrapping_sub(1);
        let idx = self
            .window
            .iter()
            .position(|e| e.packet.header.seq == acked_seq)?;
        self.window.remove(idx);
        Some(acked_seq)
    }

    /// Collect every in-flight segment due for retransmission at `now`.
    ///
    /// An entry is due when its last transmission is older than `timeout`.
    /// Each returned packet is a byte-identical clone of the original; the
    /// entry's `sent_at` is refreshed, so the caller just puts the packets
    /// back on the wire.
    pub fn take_retransmittable(&mut self, now: Instant, timeout: Duration) -> Vec<Packet> {
        let mut due = Vec::new();
        for entry in self.window.iter_mut() {
            if now.duration_since(entry.sent_at) > timeout {
                entry.sent_at = now;
                due.push(entry.packet.clone());
            }
        }
        due
    }
}
