//! Connection finite-state machine (FSM) types.
//!
//! DRTP runs one connection per process, and each role walks a short, fixed
//! path through its state space.  The states are explicit enums so that an
//! illegal phase (e.g. starting the data transfer before the handshake) is
//! an early, loud error rather than a silently-ignored branch.
//!
//! Transitions are *not* implemented here — they live in the role drivers
//! ([`crate::client`] and [`crate::server`]), which check the current state
//! before each phase and advance it as the protocol progresses.

/// States of the client-side FSM.
///
/// ```text
/// Idle ──SYN sent──▶ SynSent ──SYN-ACK──▶ Established
///                                              │ data phase done,
///                                              │ FIN sent
///                                              ▼
///                      Closed ◀──FIN ACKed── FinWait
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientState {
    /// No connection exists; initial state.
    #[default]
    Idle,
    /// SYN has been sent; waiting for SYN-ACK.
    SynSent,
    /// Three-way handshake complete; data transfer may proceed.
    Established,
    /// FIN has been sent; waiting for its ACK.
    FinWait,
    /// Teardown complete (or abandoned after a teardown timeout).
    Closed,
}

/// States of the server-side FSM.
///
/// ```text
/// Listening ──SYN──▶ SynReceived ──ACK──▶ Established ──FIN──▶ Closed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting (without timeout) for a client's SYN.
    #[default]
    Listening,
    /// SYN received and SYN-ACK sent; waiting for the final handshake ACK.
    SynReceived,
    /// Handshake complete; receiving data segments.
    Established,
    /// FIN observed and acknowledged; connection finished.
    Closed,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
