//! Connection-level constants and the shared transfer error type.
//!
//! Both role drivers ([`crate::client`], [`crate::server`]) speak the same
//! timing contract and fail in the same ways; this module holds what they
//! share.  Data-phase timeouts are *not* represented here — they are handled
//! locally by the retransmission loop and never escalate.

use std::time::Duration;

use crate::socket::SocketError;

/// Retransmission timeout, and the bound on every protocol wait except the
/// server's initial listen.
pub const RTO: Duration = Duration::from_millis(500);

/// Errors that terminate a transfer.
#[derive(Debug)]
pub enum TransferError {
    /// Underlying socket failure (bind, send, receive) other than a timeout.
    Socket(SocketError),
    /// No SYN-ACK within [`RTO`].  The handshake is attempted exactly once.
    HandshakeTimeout,
    /// No ACK of our FIN within [`RTO`].
    TeardownTimeout,
    /// Reading the source / writing the destination stream failed.
    Io(std::io::Error),
    /// A phase was entered in the wrong connection state.
    BadState,
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::Socket(e) => write!(f, "socket error: {e}"),
            TransferError::HandshakeTimeout => {
                write!(f, "connection failed: no SYN-ACK within {RTO:?}")
            }
            TransferError::TeardownTimeout => {
                write!(f, "teardown failed: FIN was not acknowledged within {RTO:?}")
            }
            TransferError::Io(e) => write!(f, "file stream error: {e}"),
            TransferError::BadState => write!(f, "operation attempted in an illegal state"),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<SocketError> for TransferError {
    fn from(e: SocketError) -> Self {
        Self::Socket(e)
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
