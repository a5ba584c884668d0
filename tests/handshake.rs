//! Integration tests for the connection-establishment handshake.
//!
//! Each test spins up the two roles (or one role plus a raw packet socket)
//! over the loopback interface as separate tokio tasks, so both sides make
//! progress concurrently.

use std::time::Duration;

use drtp::client::FileSender;
use drtp::connection::TransferError;
use drtp::fault::PassThrough;
use drtp::packet::{flags, Packet};
use drtp::server::FileReceiver;
use drtp::socket::Socket;
use drtp::state::{ClientState, ServerState};

/// Bind a socket to an OS-assigned port on loopback.
async fn ephemeral() -> Socket {
    let addr = "127.0.0.1:0".parse().unwrap();
    Socket::bind(addr).await.expect("bind failed")
}

// ---------------------------------------------------------------------------
// Test 1: responder replies SYN-ACK with ack = seq + 1
// ---------------------------------------------------------------------------

#[tokio::test]
async fn responder_happy_path_packet_exchange() {
    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept")
    });

    // Drive the responder with a raw socket so each reply can be inspected.
    let wire = ephemeral().await;
    wire
        .send_to(&Packet::control(0, 0, flags::SYN), server_addr)
        .await
        .expect("send SYN");

    let (reply, from) = wire.recv_from().await.expect("recv SYN-ACK");
    assert_eq!(from, server_addr);
    assert_eq!(reply.header.flags, flags::SYN | flags::ACK);
    assert_eq!(reply.header.seq, 0);
    assert_eq!(reply.header.ack, 1); // seq + 1
    assert!(reply.payload.is_empty());

    wire
        .send_to(&Packet::control(0, 0, flags::ACK), server_addr)
        .await
        .expect("send ACK");

    let conn = server.await.unwrap();
    assert_eq!(conn.state(), ServerState::Established);
}

// ---------------------------------------------------------------------------
// Test 2: full three-way handshake between both role drivers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initiator_and_responder_establish() {
    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept")
    });

    let client = tokio::spawn(async move {
        let sock = ephemeral().await;
        FileSender::connect(sock, server_addr, 3).await.expect("connect")
    });

    let (server_conn, client_conn) = tokio::join!(server, client);
    assert_eq!(server_conn.unwrap().state(), ServerState::Established);
    assert_eq!(client_conn.unwrap().state(), ClientState::Established);
}

// ---------------------------------------------------------------------------
// Test 3: handshake timeout is fatal and not retried
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initiator_times_out_against_silent_peer() {
    // A bound socket that never answers.
    let silent = ephemeral().await;
    let silent_addr = silent.local_addr;

    let sock = ephemeral().await;
    let started = tokio::time::Instant::now();
    let err = FileSender::connect(sock, silent_addr, 3)
        .await
        .expect_err("handshake should fail");

    assert!(matches!(err, TransferError::HandshakeTimeout));
    // Single attempt: one 0.5 s wait, no retry loop.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(450), "gave up too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "kept retrying: {elapsed:?}");
}

// ---------------------------------------------------------------------------
// Test 4: responder ignores everything that is not a SYN
// ---------------------------------------------------------------------------

#[tokio::test]
async fn responder_ignores_non_syn_while_listening() {
    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept")
    });

    let wire = ephemeral().await;

    // Noise first: a stray ACK and an early data segment.
    wire
        .send_to(&Packet::control(9, 9, flags::ACK), server_addr)
        .await
        .unwrap();
    wire
        .send_to(&Packet::data(1, b"early".to_vec()), server_addr)
        .await
        .unwrap();

    // The responder must still answer the real SYN.
    wire
        .send_to(&Packet::control(0, 0, flags::SYN), server_addr)
        .await
        .unwrap();
    let (reply, _) = wire.recv_from().await.expect("recv SYN-ACK");
    assert_eq!(reply.header.flags, flags::SYN | flags::ACK);

    wire
        .send_to(&Packet::control(0, 0, flags::ACK), server_addr)
        .await
        .unwrap();
    assert_eq!(server.await.unwrap().state(), ServerState::Established);
}
