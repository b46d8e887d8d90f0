//! Connection lifecycle and endpoint failover.

mod common;

use btmanager::chain::ConnectionState;
use btmanager::queries::{get_balance, get_current_block};
use btmanager::{ChainConnection, Rao, RetryConfig};
use common::*;
use std::sync::Arc;

const PRIMARY: &str = "ws://primary:9944";
const FALLBACK: &str = "ws://fallback:9944";

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        retry_timeout_secs: 1,
        initial_delay_ms: 1,
        max_delay_ms: 2,
    }
}

fn nodes() -> (Arc<MockRpc>, Arc<MockRpc>) {
    let primary = Arc::new(MockRpc::new(PRIMARY));
    let fallback = Arc::new(MockRpc::new(FALLBACK));
    primary.set_block(100);
    fallback.set_block(101);
    (primary, fallback)
}

#[tokio::test]
async fn test_connects_to_primary_first() {
    let (primary, fallback) = nodes();
    let connector = Arc::new(MockConnector::new(vec![primary, fallback]));
    let mut conn = ChainConnection::with_retry(fast_retry());

    conn.connect_using(connector.clone(), PRIMARY, &[FALLBACK.to_string()])
        .await
        .unwrap();
    assert_eq!(conn.state(), ConnectionState::Connected);
    assert_eq!(conn.endpoint().as_deref(), Some(PRIMARY));
    assert_eq!(get_current_block(&conn).await.unwrap(), 100);
    assert_eq!(connector.attempts(), vec![PRIMARY.to_string()]);
}

#[tokio::test]
async fn test_unreachable_primary_uses_fallback() {
    let (primary, fallback) = nodes();
    let connector = Arc::new(MockConnector::new(vec![primary, fallback]));
    connector.take_down(PRIMARY);
    let mut conn = ChainConnection::with_retry(fast_retry());

    conn.connect_using(connector.clone(), PRIMARY, &[FALLBACK.to_string()])
        .await
        .unwrap();
    assert_eq!(conn.endpoint().as_deref(), Some(FALLBACK));
    assert_eq!(get_current_block(&conn).await.unwrap(), 101);
}

#[tokio::test]
async fn test_reads_move_to_fallback_when_primary_breaks() {
    let (primary, fallback) = nodes();
    let coldkey = address(1);
    fallback.reply_for(
        "System.Account",
        &[account_key(&coldkey)],
        Reply::Value(account_info(3_000_000_000)),
    );
    let connector = Arc::new(MockConnector::new(vec![primary.clone(), fallback.clone()]));
    let mut conn = ChainConnection::with_retry(fast_retry());
    conn.connect_using(connector, PRIMARY, &[FALLBACK.to_string()])
        .await
        .unwrap();

    primary.set_broken(true);
    assert_eq!(get_balance(&conn, &coldkey).await.unwrap(), Rao(3_000_000_000));
    assert_eq!(conn.endpoint().as_deref(), Some(FALLBACK));
    assert_eq!(primary.call_count("System.Account"), 1);
}

#[tokio::test]
async fn test_all_endpoints_down_is_a_connection_error() {
    let (primary, fallback) = nodes();
    let connector = Arc::new(MockConnector::new(vec![primary, fallback]));
    connector.take_down(PRIMARY);
    connector.take_down(FALLBACK);
    let mut conn = ChainConnection::with_retry(fast_retry());

    let err = conn
        .connect_using(connector.clone(), PRIMARY, &[FALLBACK.to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.rpc_url.as_deref(), Some(PRIMARY));
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(get_balance(&conn, &address(1)).await.unwrap_err().is_not_connected());
    assert_eq!(connector.attempts().len(), 3);
}

#[tokio::test]
async fn test_single_endpoint_without_fallbacks() {
    let (primary, _) = nodes();
    let connector = Arc::new(MockConnector::new(vec![primary]));
    let mut conn = ChainConnection::new();

    conn.connect_using(connector.clone(), PRIMARY, &[]).await.unwrap();
    assert_eq!(conn.endpoint().as_deref(), Some(PRIMARY));

    let err = conn
        .connect_using(connector, "ws://nowhere:1", &[])
        .await
        .unwrap_err();
    assert_eq!(err.rpc_url.as_deref(), Some("ws://nowhere:1"));
    assert!(!conn.is_connected());
}

#[tokio::test]
async fn test_close_ends_the_session() {
    let (primary, _) = nodes();
    let mut conn = connected(&primary);
    assert!(conn.is_connected());

    conn.close();
    conn.close();
    assert_eq!(conn.state(), ConnectionState::Closed);
    assert!(conn.endpoint().is_none());
    assert!(get_current_block(&conn).await.unwrap_err().is_not_connected());
}
