//! Client role driver: handshake initiator, window sender, teardown initiator.
//!
//! A [`FileSender`] owns the UDP socket for the lifetime of one transfer and
//! walks the client FSM in order:
//!
//! 1. [`connect`](FileSender::connect) — three-way handshake
//!    (`Idle → SynSent → Established`).  A handshake timeout is fatal; the
//!    SYN is sent exactly once.
//! 2. [`transfer`](FileSender::transfer) — Go-Back-N sliding-window data
//!    phase over any `AsyncRead` source.  Data-phase timeouts never escalate;
//!    they trigger whole-window retransmission.
//! 3. [`close`](FileSender::close) — FIN / ACK teardown
//!    (`Established → FinWait → Closed`).
//!
//! All waits are bounded by [`RTO`]; the single suspension point per phase
//! is the `timeout(RTO, recv_from())` call.

use std::net::SocketAddr;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use crate::connection::{TransferError, RTO};
use crate::packet::{flags, Packet, MAX_PAYLOAD};
use crate::sender::WindowSender;
use crate::socket::{Socket, SocketError};
use crate::state::ClientState;

/// Accounting for one completed data phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferStats {
    /// Total payload bytes handed to the wire (excluding retransmissions).
    pub bytes: u64,
    /// Distinct data segments sent.
    pub data_segments: u64,
    /// Segments sent again after a retransmission timeout.
    pub retransmissions: u64,
}

/// The client half of a DRTP transfer.
#[derive(Debug)]
pub struct FileSender {
    state: ClientState,
    socket: Socket,
    peer: SocketAddr,
    window: WindowSender,
}

impl FileSender {
    fn set_state(&mut self, next: ClientState) {
        log::debug!("client state {} -> {next}", self.state);
        self.state = next;
    }

    /// Perform the three-way handshake with the server at `peer`.
    ///
    /// Sends `SYN(seq=0, ack=0)` once and waits up to [`RTO`] for a
    /// `SYN|ACK`; segments with any other flag combination (or malformed
    /// datagrams) are ignored and the wait restarts.  A timeout is fatal —
    /// the handshake is never retried.
    pub async fn connect(
        socket: Socket,
        peer: SocketAddr,
        window_size: u16,
    ) -> Result<Self, TransferError> {
        let mut conn = Self {
            state: ClientState::Idle,
            socket,
            peer,
            window: WindowSender::new(window_size as usize),
        };

        conn.socket
            .send_to(&Packet::control(0, 0, flags::SYN), peer)
            .await?;
        conn.set_state(ClientState::SynSent);
        log::info!("SYN packet is sent");

        loop {
            match timeout(RTO, conn.socket.recv_from()).await {
                Err(_elapsed) => {
                    log::error!("connection failed: no SYN-ACK within {RTO:?}");
                    return Err(TransferError::HandshakeTimeout);
                }
                Ok(Err(SocketError::Decode(e))) => {
                    log::debug!("ignoring malformed datagram during handshake: {e}");
                }
                Ok(Err(e)) => return Err(e.into()),
                Ok(Ok((pkt, addr))) => {
                    if addr != peer {
                        continue;
                    }
                    if pkt.header.flags == (flags::SYN | flags::ACK) {
                        log::info!("SYN-ACK packet is received");
                        conn.socket
                            .send_to(&Packet::control(0, 0, flags::ACK), peer)
                            .await?;
                        conn.set_state(ClientState::Established);
                        log::info!("ACK packet is sent — connection established");
                        return Ok(conn);
                    }
                    // Stay in SynSent; the SYN is not resent.
                    log::debug!(
                        "ignoring segment with flags={} while waiting for SYN-ACK",
                        pkt.header.flags
                    );
                }
            }
        }
    }

    /// Transmit the whole of `src` using the sliding window.
    ///
    /// Chunks the stream into segments of up to [`MAX_PAYLOAD`] bytes (the
    /// final chunk may be shorter), sequence numbers starting at 1.  ACKs
    /// retire exactly their matching window entry; a receive timeout
    /// retransmits every window entry older than [`RTO`], byte-identical.
    pub async fn transfer<R>(&mut self, src: &mut R) -> Result<TransferStats, TransferError>
    where
        R: AsyncRead + Unpin,
    {
        if self.state != ClientState::Established {
            return Err(TransferError::BadState);
        }

        let mut stats = TransferStats::default();
        let mut eof = false;

        loop {
            // Fill the window with fresh segments while both the stream and
            // the window allow.
            while !eof && self.window.can_send() {
                let chunk = read_chunk(src).await?;
                if chunk.is_empty() {
                    eof = true;
                    break;
                }
                stats.bytes += chunk.len() as u64;
                stats.data_segments += 1;

                let pkt = self.window.build_data_packet(chunk);
                self.socket.send_to(&pkt, self.peer).await?;
                self.window.record_sent(pkt);
                log::debug!(
                    "packet with seq = {} is sent, sliding window = {:?}",
                    self.window.next_seq().wrapping_sub(1),
                    self.window.seqs()
                );
            }

            if eof && !self.window.has_unacked() {
                log::info!("data transfer finished");
                return Ok(stats);
            }

            match timeout(RTO, self.socket.recv_from()).await {
                Err(_elapsed) => {
                    // Recoverable by design: go back N.
                    log::debug!("RTO occurred — retransmitting the window");
                    let due = self.window.take_retransmittable(Instant::now(), RTO);
                    stats.retransmissions += due.len() as u64;
                    for pkt in due {
                        log::debug!("retransmitting packet with seq = {}", pkt.header.seq);
                        self.socket.send_to(&pkt, self.peer).await?;
                    }
                }
                Ok(Err(SocketError::Decode(e))) => {
                    log::debug!("ignoring malformed datagram during data phase: {e}");
                }
                Ok(Err(e)) => return Err(e.into()),
                Ok(Ok((pkt, addr))) => {
                    if addr != self.peer || pkt.header.flags != flags::ACK {
                        continue;
                    }
                    if let Some(seq) = self.window.on_ack(pkt.header.ack) {
                        log::debug!("ACK for packet = {seq} is received");
                    }
                }
            }
        }
    }

    /// Two-way teardown: send FIN, wait up to [`RTO`] for its ACK.
    ///
    /// A timeout is reported as [`TransferError::TeardownTimeout`]; the
    /// connection ends `Closed` either way.
    pub async fn close(&mut self) -> Result<(), TransferError> {
        if self.state != ClientState::Established {
            return Err(TransferError::BadState);
        }

        self.socket
            .send_to(&Packet::control(0, 0, flags::FIN), self.peer)
            .await?;
        self.set_state(ClientState::FinWait);
        log::info!("FIN packet is sent");

        loop {
            match timeout(RTO, self.socket.recv_from()).await {
                Err(_elapsed) => {
                    self.set_state(ClientState::Closed);
                    log::error!("teardown failed: FIN was not acknowledged");
                    return Err(TransferError::TeardownTimeout);
                }
                Ok(Err(SocketError::Decode(e))) => {
                    log::debug!("ignoring malformed datagram during teardown: {e}");
                }
                Ok(Err(e)) => {
                    self.set_state(ClientState::Closed);
                    return Err(e.into());
                }
                Ok(Ok((pkt, addr))) => {
                    if addr != self.peer {
                        continue;
                    }
                    if pkt.header.flags == flags::ACK {
                        self.set_state(ClientState::Closed);
                        log::info!("FIN ACK packet is received — connection closed");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Current FSM state (primarily for tests).
    pub fn state(&self) -> ClientState {
        self.state
    }
}

/// Read up to [`MAX_PAYLOAD`] bytes from `src`, tolerating short reads.
///
/// Returns an empty vector at end of stream.
async fn read_chunk<R>(src: &mut R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; MAX_PAYLOAD];
    let mut filled = 0;
    while filled < buf.len() {
        let n = src.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}
