//! Server role driver: handshake responder, sequenced receiver, teardown responder.
//!
//! A [`FileReceiver`] owns the bound UDP socket and serves exactly one client
//! connection, in order:
//!
//! 1. [`accept`](FileReceiver::accept) — waits (without timeout) for a SYN,
//!    answers with SYN-ACK, waits for the final ACK
//!    (`Listening → SynReceived → Established`).
//! 2. [`receive`](FileReceiver::receive) — in-order data phase over any
//!    `AsyncWrite` destination, acknowledging cumulatively and discarding
//!    out-of-order traffic.  The server never gives up waiting for the next
//!    segment; a quiet 0.5 s interval is merely logged.
//! 3. Teardown happens inside the data loop: the segment carrying `FIN` ends
//!    the phase and is answered with `ACK(ack = seq + 1)`.
//!
//! On close the accumulated [`ReceiveStats`] (throughput accounting) are
//! returned to the caller and logged.

use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::connection::{TransferError, RTO};
use crate::fault::DropPolicy;
use crate::packet::{flags, Packet};
use crate::receiver::{ReceiveStats, SequencedReceiver, Verdict};
use crate::socket::{Socket, SocketError};
use crate::state::ServerState;

/// The server half of a DRTP transfer.
pub struct FileReceiver {
    state: ServerState,
    socket: Socket,
    /// Address of the one connected client; set when its SYN arrives.
    peer: Option<SocketAddr>,
    receiver: SequencedReceiver,
}

impl FileReceiver {
    fn set_state(&mut self, next: ServerState) {
        log::debug!("server state {} -> {next}", self.state);
        self.state = next;
    }

    /// Respond to the three-way handshake.
    ///
    /// Blocks indefinitely for a segment with `flags == SYN` (everything
    /// else is ignored), replies `SYN|ACK, seq=0, ack=s+1`, then blocks for
    /// the client's `ACK`.  `policy` is the receive-side fault-injection
    /// hook for the data phase.
    pub async fn accept(
        socket: Socket,
        policy: Box<dyn DropPolicy>,
    ) -> Result<Self, TransferError> {
        let mut conn = Self {
            state: ServerState::Listening,
            socket,
            peer: None,
            receiver: SequencedReceiver::new(policy),
        };

        // Listening: wait for a SYN, forever if need be.
        let peer = loop {
            match conn.socket.recv_from().await {
                Err(SocketError::Decode(e)) => {
                    log::debug!("ignoring malformed datagram while listening: {e}");
                }
                Err(e) => return Err(e.into()),
                Ok((pkt, addr)) => {
                    if pkt.header.flags == flags::SYN {
                        log::info!("SYN packet is received");
                        let syn_ack = Packet::control(
                            0,
                            pkt.header.seq.wrapping_add(1),
                            flags::SYN | flags::ACK,
                        );
                        conn.socket.send_to(&syn_ack, addr).await?;
                        log::info!("SYN-ACK packet is sent");
                        break addr;
                    }
                    log::debug!(
                        "ignoring segment with flags={} while listening",
                        pkt.header.flags
                    );
                }
            }
        };
        conn.peer = Some(peer);
        conn.set_state(ServerState::SynReceived);

        // SynReceived: wait for the final handshake ACK.
        loop {
            match conn.socket.recv_from().await {
                Err(SocketError::Decode(e)) => {
                    log::debug!("ignoring malformed datagram during handshake: {e}");
                }
                Err(e) => return Err(e.into()),
                Ok((pkt, addr)) => {
                    if addr == peer && pkt.header.flags == flags::ACK {
                        log::info!("ACK packet is received — connection established");
                        conn.set_state(ServerState::Established);
                        return Ok(conn);
                    }
                    log::debug!(
                        "ignoring segment with flags={} while waiting for ACK",
                        pkt.header.flags
                    );
                }
            }
        }
    }

    /// Run the data phase, writing accepted payloads to `dst` in order.
    ///
    /// Returns when the client's FIN has been observed and acknowledged.
    pub async fn receive<W>(&mut self, dst: &mut W) -> Result<ReceiveStats, TransferError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.state != ServerState::Established {
            return Err(TransferError::BadState);
        }
        let peer = self.peer.ok_or(TransferError::BadState)?;

        loop {
            let (pkt, addr) = match timeout(RTO, self.socket.recv_from()).await {
                Err(_elapsed) => {
                    // Unbounded retries: the server never gives up waiting.
                    log::debug!("socket timeout while waiting for a packet");
                    continue;
                }
                Ok(Err(SocketError::Decode(e))) => {
                    log::debug!("ignoring malformed datagram during data phase: {e}");
                    continue;
                }
                Ok(Err(e)) => return Err(e.into()),
                Ok(Ok(v)) => v,
            };
            if addr != peer {
                continue;
            }

            let h = pkt.header;

            // Data acceptance looks only at the sequence number; a FIN rider
            // does not exempt the segment's payload from in-order delivery.
            if (h.flags & !flags::FIN) == 0 {
                match self.receiver.on_segment(h.seq, &pkt.payload) {
                    Verdict::Deliver { ack } => {
                        log::debug!("packet {} is received", h.seq);
                        dst.write_all(&pkt.payload).await?;
                        let reply = Packet::control(0, ack, flags::ACK);
                        self.socket.send_to(&reply, peer).await?;
                        log::debug!("sending ack for the received {}", h.seq);
                    }
                    Verdict::Dropped => {
                        log::debug!("packet {} was discarded", h.seq);
                    }
                    Verdict::OutOfOrder => {
                        log::debug!("out-of-order packet {} is received", h.seq);
                    }
                    Verdict::Duplicate => {
                        log::debug!("duplicate packet {} is received", h.seq);
                    }
                }
            }

            // Teardown is triggered by the FIN flag regardless of whether the
            // segment's payload was accepted above.
            if h.flags == flags::FIN {
                log::info!("FIN packet is received");
                let fin_ack = Packet::control(0, h.seq.wrapping_add(1), flags::ACK);
                self.socket.send_to(&fin_ack, peer).await?;
                log::info!("FIN ACK packet is sent");
                self.set_state(ServerState::Closed);
                break;
            }
        }

        dst.flush().await?;
        let stats = self.receiver.stats();
        log::info!(
            "the throughput is {:.2} Mbps — connection closed",
            stats.throughput_mbps()
        );
        Ok(stats)
    }

    /// Current FSM state (primarily for tests).
    pub fn state(&self) -> ServerState {
        self.state
    }
}
