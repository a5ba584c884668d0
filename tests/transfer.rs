//! End-to-end transfer tests over the loopback interface.
//!
//! Server and client run as separate tokio tasks; the source stream is an
//! in-memory cursor and the destination is an in-memory buffer, so the tests
//! assert byte-identical delivery without touching the filesystem.

use std::io::Cursor;

use drtp::client::FileSender;
use drtp::fault::{self, PassThrough};
use drtp::packet::{flags, Header, Packet, MAX_PAYLOAD};
use drtp::server::FileReceiver;
use drtp::socket::Socket;
use drtp::state::ClientState;

async fn ephemeral() -> Socket {
    let addr = "127.0.0.1:0".parse().unwrap();
    Socket::bind(addr).await.expect("bind failed")
}

/// A payload with enough structure that reordering or truncation shows up.
fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// ---------------------------------------------------------------------------
// Test 1: three full segments, loss-free — the minimal complete exchange
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_full_segments_loss_free() {
    let data = patterned(3 * MAX_PAYLOAD); // 2982 bytes, no partial tail
    let expected = data.clone();

    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        let mut conn = FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept");
        let mut received: Vec<u8> = Vec::new();
        let stats = conn.receive(&mut received).await.expect("receive");
        (received, stats)
    });

    let client = tokio::spawn(async move {
        let sock = ephemeral().await;
        let mut conn = FileSender::connect(sock, server_addr, 3).await.expect("connect");
        let stats = conn
            .transfer(&mut Cursor::new(data))
            .await
            .expect("transfer");
        conn.close().await.expect("close");
        (stats, conn.state())
    });

    let (server_out, client_out) = tokio::join!(server, client);
    let (received, recv_stats) = server_out.unwrap();
    let (send_stats, client_state) = client_out.unwrap();

    assert_eq!(received, expected);
    assert_eq!(send_stats.data_segments, 3);
    assert_eq!(send_stats.retransmissions, 0);
    assert_eq!(send_stats.bytes, 2982);
    assert_eq!(recv_stats.bytes, 2982);
    assert_eq!(client_state, ClientState::Closed);
}

// ---------------------------------------------------------------------------
// Test 2: short final segment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_final_segment() {
    let data = patterned(2 * MAX_PAYLOAD + 100);
    let expected = data.clone();

    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        let mut conn = FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept");
        let mut received: Vec<u8> = Vec::new();
        conn.receive(&mut received).await.expect("receive");
        received
    });

    let client = tokio::spawn(async move {
        let sock = ephemeral().await;
        let mut conn = FileSender::connect(sock, server_addr, 3).await.expect("connect");
        let stats = conn
            .transfer(&mut Cursor::new(data))
            .await
            .expect("transfer");
        conn.close().await.expect("close");
        stats
    });

    let (server_out, client_out) = tokio::join!(server, client);
    assert_eq!(server_out.unwrap(), expected);
    // Two full segments plus the 100-byte tail.
    assert_eq!(client_out.unwrap().data_segments, 3);
}

// ---------------------------------------------------------------------------
// Test 3: a discarded segment forces a retransmission and still delivers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discard_hook_forces_retransmission() {
    let data = patterned(4 * MAX_PAYLOAD);
    let expected = data.clone();

    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        // Drop the in-order arrival of seq 2, exactly once.
        let mut conn = FileReceiver::accept(server_sock, fault::from_discard(Some(2)))
            .await
            .expect("accept");
        let mut received: Vec<u8> = Vec::new();
        conn.receive(&mut received).await.expect("receive");
        received
    });

    let client = tokio::spawn(async move {
        let sock = ephemeral().await;
        let mut conn = FileSender::connect(sock, server_addr, 3).await.expect("connect");
        let stats = conn
            .transfer(&mut Cursor::new(data))
            .await
            .expect("transfer");
        conn.close().await.expect("close");
        stats
    });

    let (server_out, client_out) = tokio::join!(server, client);
    let stats = client_out.unwrap();

    assert_eq!(server_out.unwrap(), expected);
    assert_eq!(stats.data_segments, 4);
    // Segment 2 (and, under Go-Back-N, its window neighbours) went out again.
    assert!(stats.retransmissions >= 1, "expected at least one retransmission");
}

// ---------------------------------------------------------------------------
// Test 4: window of one degenerates to stop-and-wait
// ---------------------------------------------------------------------------

#[tokio::test]
async fn window_of_one_still_delivers() {
    let data = patterned(MAX_PAYLOAD + 7);
    let expected = data.clone();

    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        let mut conn = FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept");
        let mut received: Vec<u8> = Vec::new();
        conn.receive(&mut received).await.expect("receive");
        received
    });

    let client = tokio::spawn(async move {
        let sock = ephemeral().await;
        let mut conn = FileSender::connect(sock, server_addr, 1).await.expect("connect");
        conn.transfer(&mut Cursor::new(data)).await.expect("transfer");
        conn.close().await.expect("close");
    });

    let (server_out, client_out) = tokio::join!(server, client);
    client_out.unwrap();
    assert_eq!(server_out.unwrap(), expected);
}

// ---------------------------------------------------------------------------
// Test 5: empty source — no data segments, straight to teardown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_source_sends_no_data() {
    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        let mut conn = FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept");
        let mut received: Vec<u8> = Vec::new();
        let stats = conn.receive(&mut received).await.expect("receive");
        (received, stats)
    });

    let client = tokio::spawn(async move {
        let sock = ephemeral().await;
        let mut conn = FileSender::connect(sock, server_addr, 3).await.expect("connect");
        let stats = conn
            .transfer(&mut Cursor::new(Vec::new()))
            .await
            .expect("transfer");
        conn.close().await.expect("close");
        stats
    });

    let (server_out, client_out) = tokio::join!(server, client);
    let (received, recv_stats) = server_out.unwrap();
    let send_stats = client_out.unwrap();

    assert!(received.is_empty());
    assert_eq!(send_stats.data_segments, 0);
    assert_eq!(recv_stats.bytes, 0);
}

// ---------------------------------------------------------------------------
// Test 6: a FIN riding on the next in-order data segment still delivers it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fin_with_in_order_payload_is_delivered() {
    let server_sock = ephemeral().await;
    let server_addr = server_sock.local_addr;

    let server = tokio::spawn(async move {
        let mut conn = FileReceiver::accept(server_sock, Box::new(PassThrough))
            .await
            .expect("accept");
        let mut received: Vec<u8> = Vec::new();
        conn.receive(&mut received).await.expect("receive");
        received
    });

    // Drive the server with a raw socket so the final segment can carry both
    // a payload and the FIN flag at once.
    let wire = ephemeral().await;
    wire.send_to(&Packet::control(0, 0, flags::SYN), server_addr)
        .await
        .expect("send SYN");
    let (syn_ack, _) = wire.recv_from().await.expect("recv SYN-ACK");
    assert_eq!(syn_ack.header.flags, flags::SYN | flags::ACK);
    wire.send_to(&Packet::control(0, 0, flags::ACK), server_addr)
        .await
        .expect("send ACK");

    let last = Packet {
        header: Header {
            seq: 1,
            ack: 0,
            flags: flags::FIN,
        },
        payload: b"tail".to_vec(),
    };
    wire.send_to(&last, server_addr).await.expect("send FIN with payload");

    // The payload is acknowledged like any in-order data segment, then the
    // FIN itself is acknowledged.
    let (data_ack, _) = wire.recv_from().await.expect("recv data ACK");
    assert_eq!(data_ack.header.flags, flags::ACK);
    assert_eq!(data_ack.header.ack, 2);

    let (fin_ack, _) = wire.recv_from().await.expect("recv FIN ACK");
    assert_eq!(fin_ack.header.flags, flags::ACK);
    assert_eq!(fin_ack.header.ack, 2); // seq + 1

    assert_eq!(server.await.unwrap(), b"tail".to_vec());
}
