//! Wire-format definitions for DRTP segments.
//!
//! Every datagram exchanged between peers is a [`Packet`].  This module is
//! responsible for:
//! - Defining the on-wire binary layout (header fields, flags, payload).
//! - Serialising a [`Packet`] into a byte buffer ready for transmission.
//! - Deserialising a raw byte slice back into a [`Packet`], returning errors
//!   for truncated input.
//!
//! No I/O happens here — this is pure data transformation.
//!
//! # Wire format
//!
//! All fields are **big-endian**.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |        Sequence Number        |     Acknowledgment Number     |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |             Flags             |          Payload ...          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Total header size: [`HEADER_LEN`] = 6 bytes — seq(2) + ack(2) + flags(2).
//! The payload (if any) follows immediately, up to [`MAX_PAYLOAD`] bytes, so
//! a whole segment never exceeds [`MAX_SEGMENT`] bytes on the wire.
//!
//! Flag combinations are *not* validated here; each protocol phase checks
//! the exact combination it expects.

/// Bit-flag constants for the `flags` header field.
///
/// Only `SYN`, `ACK`, `FIN` and the combination `SYN | ACK` are meaningful
/// in DRTP; no other combination is defined.
pub mod flags {
    /// Synchronise — handshake initiation.
    pub const SYN: u16 = 1;
    /// Acknowledgement field is valid.
    pub const ACK: u16 = 2;
    /// Finish — sender has no more data to send.
    pub const FIN: u16 = 4;
}

/// Byte length of the fixed-size header on the wire.
pub const HEADER_LEN: usize = 6;

/// Maximum payload bytes per segment.
pub const MAX_PAYLOAD: usize = 994;

/// Maximum total segment size (header + payload).
pub const MAX_SEGMENT: usize = HEADER_LEN + MAX_PAYLOAD;

// Byte offsets of each field within the serialised header.
const OFF_SEQ: usize = 0;
const OFF_ACK: usize = 2;
const OFF_FLAGS: usize = 4;

/// Fixed-size DRTP header.
///
/// Fields are in host byte order; [`Packet::encode`] converts to big-endian
/// on the wire and [`Packet::decode`] converts back.  The three fields being
/// `u16` enforces the 16-bit wire range by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Sequence number of this segment (1-based for data, 0 for control).
    pub seq: u16,
    /// Acknowledgment number (next expected sequence number from the peer).
    pub ack: u16,
    /// Bitmask of [`flags`] constants; zero for plain data segments.
    pub flags: u16,
}

/// A complete DRTP datagram: header + payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub payload: Vec<u8>,
}

impl Packet {
    /// A payload-free control segment (SYN / ACK / FIN exchanges).
    pub fn control(seq: u16, ack: u16, flags: u16) -> Self {
        Self {
            header: Header { seq, ack, flags },
            payload: Vec::new(),
        }
    }

    /// A data segment carrying `payload`: `flags = 0`, acknowledgment unused.
    pub fn data(seq: u16, payload: Vec<u8>) -> Self {
        Self {
            header: Header {
                seq,
                ack: 0,
                flags: 0,
            },
            payload,
        }
    }

    /// Serialise this packet into a newly allocated byte vector.
    ///
    /// Returns [`EncodingError`] when the payload exceeds [`MAX_PAYLOAD`]
    /// bytes — that is an invariant violation upstream, never a recoverable
    /// wire condition.
    pub fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        if self.payload.len() > MAX_PAYLOAD {
            return Err(EncodingError::PayloadTooLarge(self.payload.len()));
        }

        let mut buf = vec![0u8; HEADER_LEN + self.payload.len()];
        buf[OFF_SEQ..OFF_SEQ + 2].copy_from_slice(&self.header.seq.to_be_bytes());
        buf[OFF_ACK..OFF_ACK + 2].copy_from_slice(&self.header.ack.to_be_bytes());
        buf[OFF_FLAGS..OFF_FLAGS + 2].copy_from_slice(&self.header.flags.to_be_bytes());
        buf[HEADER_LEN..].copy_from_slice(&self.payload);
        Ok(buf)
    }

    /// Parse a [`Packet`] from a raw byte slice.
    ///
    /// Returns [`DecodingError`] if `buf` is shorter than [`HEADER_LEN`].
    /// Everything after the header is payload; flag combinations are left
    /// for the caller to check.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodingError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodingError::BufferTooShort(buf.len()));
        }

        let seq = u16::from_be_bytes([buf[OFF_SEQ], buf[OFF_SEQ + 1]]);
        let ack = u16::from_be_bytes([buf[OFF_ACK], buf[OFF_ACK + 1]]);
        let flags = u16::from_be_bytes([buf[OFF_FLAGS], buf[OFF_FLAGS + 1]]);

        Ok(Packet {
            header: Header { seq, ack, flags },
            payload: buf[HEADER_LEN..].to_vec(),
        })
    }
}

/// Error raised when a segment cannot be serialised.
#[derive(Debug, PartialEq, Eq)]
pub enum EncodingError {
    /// Payload longer than [`MAX_PAYLOAD`] bytes.
    PayloadTooLarge(usize),
}

impl std::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingError::PayloadTooLarge(n) => {
                write!(f, "payload of {n} bytes exceeds the {MAX_PAYLOAD}-byte limit")
            }
        }
    }
}

impl std::error::Error for EncodingError {}

/// Error raised when a raw datagram cannot be parsed.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodingError {
    /// Buffer shorter than the fixed header size.
    BufferTooShort(usize),
}

impl std::fmt::Display for DecodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodingError::BufferTooShort(n) => {
                write!(f, "datagram of {n} bytes is shorter than the {HEADER_LEN}-byte header")
            }
        }
    }
}

impl std::error::Error for DecodingError {}
