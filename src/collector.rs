// Assembles one Snapshot per viewer request

use crate::metrics::HostMetricsSource;
use crate::models::{
    DriveUsage, LoadAverage, NetworkCounters, NetworkDelta, PortTable, Session, Snapshot,
    snapshot_ports,
};
use crate::probe;
use std::sync::Arc;
use std::time::Duration;

/// Substituted for any string field whose read failed; one failing source
/// never blocks the rest of the payload.
pub const UNAVAILABLE: &str = "unavailable";

pub struct SnapshotCollector {
    source: Arc<dyn HostMetricsSource>,
    ports: Arc<PortTable>,
    probe_host: String,
    probe_timeout: Duration,
    interface: String,
}

impl SnapshotCollector {
    pub fn new(
        source: Arc<dyn HostMetricsSource>,
        ports: Arc<PortTable>,
        probe_host: String,
        probe_timeout: Duration,
        interface: String,
    ) -> Self {
        Self {
            source,
            ports,
            probe_host,
            probe_timeout,
            interface,
        }
    }

    /// Start a port scan without waiting for it. Also called at admission
    /// so the table has usually settled by the first viewer request.
    pub fn prime_ports(&self) {
        probe::spawn_scan(
            self.ports.clone(),
            self.probe_host.clone(),
            self.probe_timeout,
        );
    }

    /// Collect a fresh snapshot for one session.
    ///
    /// Kicks off a port scan without awaiting it (the snapshot reports the
    /// table as currently known), reads every metric anew, and advances the
    /// session's network baseline. Nothing is cached across calls.
    pub async fn collect(&self, session: &mut Session) -> Snapshot {
        self.prime_ports();

        let source = self.source.clone();
        let interface = self.interface.clone();
        let reads = tokio::task::spawn_blocking(move || read_all(source.as_ref(), &interface))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, operation = "read_all", "metrics task join failed");
                MetricReads::default()
            });

        let delta = match reads.counters {
            Some(c) => session.update_network(c),
            None => NetworkDelta { tx: 0, rx: 0 },
        };
        let load = reads.load.unwrap_or_else(|| LoadAverage {
            now: UNAVAILABLE.into(),
            five: UNAVAILABLE.into(),
            fifteen: UNAVAILABLE.into(),
        });

        Snapshot {
            now: load.now,
            five: load.five,
            fifteen: load.fifteen,
            count: string_or_unavailable(reads.cpu_count),
            mhz: reads.cpu_mhz.unwrap_or_else(|| UNAVAILABLE.into()),
            free: string_or_unavailable(reads.mem_free_kb),
            total: string_or_unavailable(reads.mem_total_kb),
            drives: reads.drives.unwrap_or_default(),
            ports: snapshot_ports(&self.ports),
            tx: delta.tx,
            rx: delta.rx,
        }
    }

    /// Single cheap read used for the admission greeting.
    pub async fn uptime(&self) -> String {
        let source = self.source.clone();
        tokio::task::spawn_blocking(move || source.uptime_seconds())
            .await
            .ok()
            .and_then(|r| log_read_err("uptime_seconds", r))
            .map(|secs| secs.to_string())
            .unwrap_or_else(|| UNAVAILABLE.into())
    }
}

/// Raw per-metric results; each read degrades independently.
#[derive(Default)]
struct MetricReads {
    load: Option<LoadAverage>,
    cpu_count: Option<usize>,
    cpu_mhz: Option<String>,
    mem_free_kb: Option<u64>,
    mem_total_kb: Option<u64>,
    drives: Option<Vec<DriveUsage>>,
    counters: Option<NetworkCounters>,
}

fn read_all(source: &dyn HostMetricsSource, interface: &str) -> MetricReads {
    MetricReads {
        load: log_read_err("load_average", source.load_average()),
        cpu_count: log_read_err("cpu_count", source.cpu_count()),
        cpu_mhz: log_read_err("cpu_mhz", source.cpu_mhz()),
        mem_free_kb: log_read_err("mem_free_kb", source.mem_free_kb()),
        mem_total_kb: log_read_err("mem_total_kb", source.mem_total_kb()),
        drives: log_read_err("disk_usage", source.disk_usage()),
        counters: log_read_err("network_counters", source.network_counters(interface)),
    }
}

fn log_read_err<T>(operation: &'static str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, operation, "metric read failed");
            None
        }
    }
}

fn string_or_unavailable<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNAVAILABLE.into())
}
