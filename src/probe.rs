// Concurrent TCP reachability probes over the shared port table

use crate::models::PortTable;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

/// Probe every target once and wait for all of them to settle.
///
/// A successful connect marks the target reachable and drops the stream
/// immediately (probe-only, no data exchanged). Errors and timeouts leave
/// the flag at its prior value, so a target seen up once stays up until
/// some later probe reconnects; readers must tolerate that staleness
/// window. Probe failures are swallowed, indistinguishable from "no
/// service listening".
pub async fn scan(table: &Arc<PortTable>, host: &str, timeout: Duration) {
    let probes: Vec<_> = (0..table.len())
        .map(|i| {
            let table = table.clone();
            let host = host.to_string();
            tokio::spawn(async move {
                let entry = &table[i];
                if connect_ok(&host, entry.port, timeout).await {
                    entry.set_reachable(true);
                }
            })
        })
        .collect();
    for result in join_all(probes).await {
        if let Err(e) = result {
            tracing::debug!(error = %e, "probe task panicked");
        }
    }
}

/// Fire-and-forget variant: starts a scan and returns without waiting.
/// Callers read whatever state the table holds at the time they look.
pub fn spawn_scan(
    table: Arc<PortTable>,
    host: String,
    timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move { scan(&table, &host, timeout).await })
}

async fn connect_ok(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}
