//! Tests for the connection manager's timeline, cancellation, and
//! observation semantics, using the paused tokio clock.

use super::ConnectionManager;
use crate::{config::Config, error::Error, state::ConnectionState};
use std::{sync::Once, time::Duration};
use tokio::time::sleep;

/// Helper to initialize tracing for tests.
fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("trace")
            .with_test_writer()
            .init();
    });
}

/// A config whose republish tick is far in the future, so sequence
/// assertions only see discrete transitions.
fn quiet_config() -> Config {
    Config {
        state_refresh_interval: Duration::from_secs(3600),
        ..Config::default()
    }
}

fn assert_progress(state: &ConnectionState, node: &str, expected: f32) {
    match state {
        ConnectionState::Connecting { node_id, progress } => {
            assert_eq!(node_id, node);
            assert!(
                (progress - expected).abs() < 1e-6,
                "expected progress {expected}, got {progress}"
            );
        }
        other => panic!("expected Connecting, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_fast_connect_walks_phases_to_connected() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("us-east-1", "fast").unwrap();
    assert!(manager.is_connecting_to("us-east-1"));

    // The first phase publishes as soon as the timeline task runs.
    sleep(Duration::from_millis(10)).await;
    assert_progress(&manager.current_state(), "us-east-1", 1.0 / 3.0);

    sleep(Duration::from_millis(590)).await;
    assert_progress(&manager.current_state(), "us-east-1", 2.0 / 3.0);

    sleep(Duration::from_millis(500)).await;
    assert_progress(&manager.current_state(), "us-east-1", 1.0);

    sleep(Duration::from_millis(500)).await;
    assert!(manager.is_connected_to("us-east-1"));
    assert!(!manager.is_connecting_to("us-east-1"));
}

#[tokio::test(start_paused = true)]
async fn test_secure_connect_is_still_connecting_at_two_seconds() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("eu-west-1", "secure").unwrap();
    sleep(Duration::from_millis(2100)).await;
    assert!(
        matches!(manager.current_state(), ConnectionState::Connecting { .. }),
        "secure attempt must not be connected at t=2s"
    );

    sleep(Duration::from_millis(3100)).await;
    assert!(manager.is_connected_to("eu-west-1"));
}

#[tokio::test(start_paused = true)]
async fn test_second_connect_is_rejected_and_state_kept() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "fast").unwrap();
    assert_eq!(manager.connect("n2", "fast"), Err(Error::AlreadyConnecting));
    assert!(manager.is_connecting_to("n1"));

    // Rejection while established, too.
    sleep(Duration::from_secs(2)).await;
    assert!(manager.is_connected_to("n1"));
    assert_eq!(manager.connect("n2", "fast"), Err(Error::AlreadyConnected));
    assert!(manager.is_connected_to("n1"));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_without_connection_fails() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());
    assert_eq!(manager.disconnect(), Err(Error::NotConnected));
    assert_eq!(manager.current_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_graceful_disconnect_settles_within_a_second() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "fast").unwrap();
    sleep(Duration::from_secs(2)).await;
    assert!(manager.is_connected_to("n1"));

    manager.disconnect().unwrap();
    assert_eq!(
        manager.current_state(),
        ConnectionState::Disconnecting { node_id: "n1".to_string() }
    );

    // A connect during teardown is busy, a second disconnect redundant.
    assert_eq!(manager.connect("n2", "fast"), Err(Error::DisconnectInProgress));
    assert_eq!(manager.disconnect(), Err(Error::AlreadyDisconnecting));

    sleep(Duration::from_millis(1100)).await;
    assert_eq!(manager.current_state(), ConnectionState::Disconnected);
    assert_eq!(manager.disconnect(), Err(Error::NotConnected));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_midway_discards_stale_attempt() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "fast").unwrap();
    sleep(Duration::from_millis(600)).await;
    assert_progress(&manager.current_state(), "n1", 2.0 / 3.0);

    // Hard cancel, then immediately reconnect to a different node.
    manager.disconnect().unwrap();
    assert_eq!(manager.current_state(), ConnectionState::Disconnected);
    manager.connect("n2", "fast").unwrap();

    // When the first attempt's task wakes it must not publish n1 progress
    // over the new attempt.
    sleep(Duration::from_millis(600)).await;
    assert_progress(&manager.current_state(), "n2", 2.0 / 3.0);

    sleep(Duration::from_secs(1)).await;
    assert!(manager.is_connected_to("n2"));
}

#[tokio::test(start_paused = true)]
async fn test_retry_from_error_reaches_connected() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.report_error(Some("n1".to_string()), "tunnel collapsed");
    assert!(matches!(
        manager.current_state(),
        ConnectionState::Error { .. }
    ));

    manager.connect("n2", "fast").unwrap();
    assert!(manager.is_connecting_to("n2"));
    sleep(Duration::from_secs(2)).await;
    assert!(manager.is_connected_to("n2"));
}

#[tokio::test(start_paused = true)]
async fn test_reported_error_invalidates_in_flight_attempt() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "fast").unwrap();
    sleep(Duration::from_millis(10)).await;

    manager.report_error(Some("n1".to_string()), "handshake rejected");
    // The phase task wakes later but its attempt is stale; the error must
    // persist until the next connect or disconnect.
    sleep(Duration::from_secs(3)).await;
    assert_eq!(
        manager.current_state(),
        ConnectionState::Error {
            node_id: Some("n1".to_string()),
            message: "handshake rejected".to_string(),
        }
    );

    manager.disconnect().unwrap();
    assert_eq!(manager.current_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_observers_see_monotonic_progress_then_connected() {
    init_tracing();
    let manager = ConnectionManager::start(quiet_config());
    let mut rx = manager.observe_state();

    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let done = matches!(state, ConnectionState::Connected { .. });
            seen.push(state);
            if done {
                break;
            }
        }
        seen
    });

    manager.connect("us-east-1", "fast").unwrap();
    sleep(Duration::from_secs(2)).await;

    let seen = collector.await.unwrap();
    let (last, connecting) = seen.split_last().unwrap();
    assert!(last.is_connected_to("us-east-1"));

    let mut previous = -1.0f32;
    for state in connecting {
        match state {
            ConnectionState::Connecting { node_id, progress } => {
                assert_eq!(node_id, "us-east-1");
                assert!(*progress > previous, "progress must strictly increase");
                previous = *progress;
            }
            other => panic!("unexpected state before Connected: {other:?}"),
        }
    }
    assert!((previous - 1.0).abs() < 1e-6, "last phase must reach 1.0");
}

#[tokio::test(start_paused = true)]
async fn test_refresh_tick_republishes_connected_duration() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "fast").unwrap();
    sleep(Duration::from_secs(2)).await;
    assert!(manager.is_connected_to("n1"));

    let mut rx = manager.observe_state();
    assert!(!rx.has_changed().unwrap());

    // No discrete transition happens, yet the tick republishes and the
    // derived duration advances.
    sleep(Duration::from_millis(1100)).await;
    assert!(rx.has_changed().unwrap());
    let duration = rx
        .borrow_and_update()
        .connected_duration()
        .unwrap();
    assert!(duration >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_timeline_and_tick() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "fast").unwrap();
    sleep(Duration::from_millis(10)).await;
    let before = manager.current_state();

    manager.shutdown();
    let mut rx = manager.observe_state();
    sleep(Duration::from_secs(5)).await;

    // No phase advance, no establishment, no republish after shutdown.
    assert_eq!(manager.current_state(), before);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_strategy_falls_back_to_fast_timing() {
    init_tracing();
    let manager = ConnectionManager::start(Config::default());

    manager.connect("n1", "no-such-plan").unwrap();
    // Fast pacing: established after ~1.5s, not the secure 5s.
    sleep(Duration::from_secs(2)).await;
    assert!(manager.is_connected_to("n1"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_connect_calls_admit_exactly_one() {
    init_tracing();
    let manager = std::sync::Arc::new(ConnectionManager::start(Config::default()));

    let (a, b) = futures::future::join(
        {
            let manager = manager.clone();
            async move { manager.connect("n1", "fast") }
        },
        {
            let manager = manager.clone();
            async move { manager.connect("n2", "fast") }
        },
    )
    .await;
    assert!(a.is_ok() ^ b.is_ok(), "exactly one connect must win");

    sleep(Duration::from_secs(2)).await;
    let state = manager.current_state();
    assert!(
        state.is_connected_to("n1") || state.is_connected_to("n2"),
        "the winning attempt must establish: {state:?}"
    );
}
