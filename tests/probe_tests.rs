// Port prober tests against real local listeners

use statuscast::models::{PortEntry, PortTable};
use statuscast::probe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

const PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

async fn local_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local_addr").port();
    (listener, port)
}

#[tokio::test]
async fn test_scan_marks_open_port_reachable() {
    let (_listener, port) = local_listener().await;
    let table: Arc<PortTable> = Arc::new(vec![PortEntry::new("test", port)]);

    probe::scan(&table, "127.0.0.1", PROBE_TIMEOUT).await;
    assert!(table[0].reachable());
}

#[tokio::test]
async fn test_scan_leaves_closed_port_unreachable() {
    // Bind then drop to get a port with no listener.
    let (listener, port) = local_listener().await;
    drop(listener);
    let table: Arc<PortTable> = Arc::new(vec![PortEntry::new("test", port)]);

    let started = Instant::now();
    probe::scan(&table, "127.0.0.1", PROBE_TIMEOUT).await;
    assert!(!table[0].reachable());
    assert!(started.elapsed() <= PROBE_TIMEOUT + Duration::from_millis(500));
}

#[tokio::test]
async fn test_scan_probes_all_targets() {
    let (_a, port_a) = local_listener().await;
    let (_b, port_b) = local_listener().await;
    let (closed, port_c) = local_listener().await;
    drop(closed);
    let table: Arc<PortTable> = Arc::new(vec![
        PortEntry::new("a", port_a),
        PortEntry::new("b", port_b),
        PortEntry::new("c", port_c),
    ]);

    probe::scan(&table, "127.0.0.1", PROBE_TIMEOUT).await;
    assert!(table[0].reachable());
    assert!(table[1].reachable());
    assert!(!table[2].reachable());
}

#[tokio::test]
async fn test_failed_rescan_keeps_sticky_reachable_flag() {
    let (listener, port) = local_listener().await;
    let table: Arc<PortTable> = Arc::new(vec![PortEntry::new("test", port)]);

    probe::scan(&table, "127.0.0.1", PROBE_TIMEOUT).await;
    assert!(table[0].reachable());

    // Service goes away; a failed re-probe must not clear the flag.
    drop(listener);
    probe::scan(&table, "127.0.0.1", PROBE_TIMEOUT).await;
    assert!(table[0].reachable());
}

#[tokio::test]
async fn test_spawn_scan_settles_on_await() {
    let (_listener, port) = local_listener().await;
    let table: Arc<PortTable> = Arc::new(vec![PortEntry::new("test", port)]);

    let handle = probe::spawn_scan(table.clone(), "127.0.0.1".into(), PROBE_TIMEOUT);
    handle.await.expect("scan task");
    assert!(table[0].reachable());
}
