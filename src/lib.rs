//! `drtp` — a reliable-data-transfer protocol for file transfer over UDP.
//!
//! DRTP provides TCP-like guarantees (ordered, acknowledged, retransmitted
//! delivery) on top of an unreliable datagram channel, using a three-way
//! connection handshake, a Go-Back-N sliding window, and a two-way teardown.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────┐  data segments  ┌────────────────┐
//!  │  FileSender  │────────────────▶│  FileReceiver  │
//!  │  (client)    │                 │  (server)      │
//!  └──────┬───────┘◀────────────────└───────┬────────┘
//!         │          cumulative ACKs        │
//!  ┌──────▼───────┐                 ┌───────▼────────┐
//!  │ WindowSender │                 │ SequencedRecv  │  (pure state,
//!  └──────┬───────┘                 └───────┬────────┘   no I/O)
//!         │                                 │
//!  ┌──────▼─────────────────────────────────▼────────┐
//!  │                    Socket                       │
//!  │   (async packet-oriented UDP, tokio)            │
//!  └─────────────────────────────────────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`packet`]     — wire format (6-byte header, encode / decode)
//! - [`socket`]     — async UDP socket abstraction
//! - [`state`]      — finite-state-machine types, one enum per role
//! - [`config`]     — validated run configuration
//! - [`fault`]      — injectable receive-side fault policy (discard test hook)
//! - [`sender`]     — sliding-window outbound state machine
//! - [`receiver`]   — in-order inbound state machine + throughput accounting
//! - [`connection`] — shared timing constants and the transfer error type
//! - [`client`]     — client driver: handshake → window transfer → teardown
//! - [`server`]     — server driver: handshake → sequenced receive → teardown

pub mod client;
pub mod config;
pub mod connection;
pub mod fault;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod server;
pub mod socket;
pub mod state;
