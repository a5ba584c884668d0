//! Receive-side fault injection for deterministic testing.
//!
//! Real networks drop packets; to exercise the retransmission machinery
//! without depending on actual loss, the server can be told to discard one
//! specific in-order segment exactly once (the `--discard` test hook).
//!
//! Rather than hard-coding that rule into the receiver, the receiver
//! consults a [`DropPolicy`] for every segment it is about to accept.  Tests
//! can plug in their own policies; production runs use [`PassThrough`] or
//! [`DropOnce`] depending on the CLI.

/// Decides whether an about-to-be-accepted segment should be dropped.
///
/// The receiver consults the policy only for segments that match the
/// expected sequence number — out-of-order segments are discarded before
/// the policy is ever asked.
pub trait DropPolicy: Send {
    /// `true` to drop the segment with this sequence number (no write, no
    /// ACK, no cursor advance).  Called once per candidate segment; the
    /// policy owns any "fire at most once" bookkeeping.
    fn should_drop(&mut self, seq: u16) -> bool;
}

/// Never drops anything; the default for normal operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl DropPolicy for PassThrough {
    fn should_drop(&mut self, _seq: u16) -> bool {
        false
    }
}

/// Drops the segment with one configured sequence number, exactly once.
///
/// Retransmissions of the same sequence number pass through normally.
#[derive(Debug, Clone, Copy)]
pub struct DropOnce {
    seq: u16,
    fired: bool,
}

impl DropOnce {
    pub fn new(seq: u16) -> Self {
        Self { seq, fired: false }
    }
}

impl DropPolicy for DropOnce {
    fn should_drop(&mut self, seq: u16) -> bool {
        if !self.fired && seq == self.seq {
            self.fired = true;
            true
        } else {
            false
        }
    }
}

/// Build the policy corresponding to an optional `--discard` argument.
pub fn from_discard(discard: Option<u16>) -> Box<dyn DropPolicy> {
    match discard {
        Some(seq) => Box::new(DropOnce::new(seq)),
        None => Box::new(PassThrough),
    }
}
