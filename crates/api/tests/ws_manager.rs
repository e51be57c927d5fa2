//! Unit tests for `WsManager`.
//!
//! These tests exercise the listener registry directly, without performing
//! any HTTP upgrades. They verify add/remove semantics, broadcast delivery,
//! log-line filtering, and graceful shutdown behaviour.

use axum::extract::ws::Message;
use temoa_gui_api::ws::WsManager;
use temoa_gui_core::log_sink::{publish, LogSink};

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 1);

    // Unknown IDs are a no-op.
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(matches!(msg1, Message::Close(None)), "Expected Close(None), got: {msg1:?}");
    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(matches!(msg2, Message::Close(None)), "Expected Close(None), got: {msg2:?}");

    // After Close, the channel should be closed (no more messages).
    assert!(rx1.recv().await.is_none(), "Channel should be closed after shutdown");
}

// ---------------------------------------------------------------------------
// Test: log lines fan out to every listener
// ---------------------------------------------------------------------------

#[tokio::test]
async fn log_lines_reach_all_listeners() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    let mut rx3 = manager.add("conn-3".to_string()).await;

    manager.emit("Starting engine...".to_string()).await;

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let msg = rx.recv().await.expect("listener should receive line");
        assert!(matches!(&msg, Message::Text(t) if t.as_str() == "Starting engine..."));
    }
}

// ---------------------------------------------------------------------------
// Test: blank log lines are never sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_lines_are_not_broadcast() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.emit("   ".to_string()).await;
    publish(&manager, "").await;
    manager.broadcast_line("\t\n").await;
    manager.broadcast_line("solved").await;

    let msg = rx.recv().await.expect("rx should receive the non-blank line");
    assert!(matches!(&msg, Message::Text(t) if t.as_str() == "solved"));
    assert!(rx.try_recv().is_err(), "no further messages expected");
}

// ---------------------------------------------------------------------------
// Test: broadcast skips closed channels without panicking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let manager = WsManager::new();

    let rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    // Drop rx1 to close its channel.
    drop(rx1);

    manager.broadcast_line("still alive").await;

    let msg = rx2.recv().await.expect("rx2 should receive broadcast");
    assert!(matches!(&msg, Message::Text(t) if t.as_str() == "still alive"));
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends a Ping to each listener
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    let msg = rx.recv().await.expect("rx should receive ping");
    assert!(matches!(msg, Message::Ping(_)));
}

// ---------------------------------------------------------------------------
// Test: adding with duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let _rx_old = manager.add("conn-1".to_string()).await;
    let mut rx_new = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.broadcast_line("replaced").await;
    let msg = rx_new.recv().await.expect("New rx should receive message");
    assert!(matches!(&msg, Message::Text(t) if t.as_str() == "replaced"));
}
