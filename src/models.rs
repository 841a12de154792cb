// Wire types, snapshot payload, and per-session state

use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// One probe target plus its most recent reachability result.
/// Serializes as the legacy `[name, port, reachable]` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub name: String,
    pub port: u16,
    pub reachable: bool,
}

impl Serialize for PortStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut t = serializer.serialize_tuple(3)?;
        t.serialize_element(&self.name)?;
        t.serialize_element(&self.port)?;
        t.serialize_element(&self.reachable)?;
        t.end()
    }
}

impl<'de> Deserialize<'de> for PortStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, port, reachable) = <(String, u16, bool)>::deserialize(deserializer)?;
        Ok(Self {
            name,
            port,
            reachable,
        })
    }
}

/// Process-wide probe target. Reachability is a field-level atomic: probe
/// tasks store it without a lock, snapshot readers tolerate a brief
/// staleness window.
#[derive(Debug)]
pub struct PortEntry {
    pub name: String,
    pub port: u16,
    reachable: AtomicBool,
}

impl PortEntry {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            reachable: AtomicBool::new(false),
        }
    }

    pub fn reachable(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }

    pub fn set_reachable(&self, up: bool) {
        self.reachable.store(up, Ordering::Relaxed);
    }

    pub fn status(&self) -> PortStatus {
        PortStatus {
            name: self.name.clone(),
            port: self.port,
            reachable: self.reachable(),
        }
    }
}

/// Shared table of probe targets, mutated in place by scans.
pub type PortTable = Vec<PortEntry>;

/// Best-effort read of the whole table as currently known.
pub fn snapshot_ports(table: &PortTable) -> Vec<PortStatus> {
    table.iter().map(PortEntry::status).collect()
}

/// 1/5/15 minute load averages, kept as opaque decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadAverage {
    pub now: String,
    pub five: String,
    pub fifteen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveUsage {
    pub percent: String,
    pub mount: String,
}

/// Raw cumulative byte counters as read from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkCounters {
    pub tx_bytes: i64,
    pub rx_bytes: i64,
}

/// Throughput since the previous reading for the same session. Negative
/// values are passed through as-is and signal a counter reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDelta {
    pub tx: i64,
    pub rx: i64,
}

/// One complete measurement bundle, serialized in the legacy wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub now: String,
    pub five: String,
    pub fifteen: String,
    pub count: String,
    #[serde(rename = "MHz")]
    pub mhz: String,
    pub free: String,
    pub total: String,
    pub drives: Vec<DriveUsage>,
    pub ports: Vec<PortStatus>,
    pub tx: i64,
    pub rx: i64,
}

/// Server→client envelope; serializes as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ServerMessage {
    Uptime(String),
    Error(String),
    Message(Vec<Snapshot>),
}

/// Server-side state for one admitted viewer, including its private
/// network-delta baseline. Owned exclusively by the connection task;
/// discarded on disconnect, so a reconnecting viewer starts fresh.
#[derive(Debug)]
pub struct Session {
    pub id: u64,
    pub connected_at: Instant,
    baseline: Option<NetworkCounters>,
}

impl Session {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            connected_at: Instant::now(),
            baseline: None,
        }
    }

    /// Feed a fresh counter reading and get the delta since the previous
    /// one. The first reading has no baseline and yields `{0,0}`; the
    /// reading always becomes the new baseline.
    pub fn update_network(&mut self, counters: NetworkCounters) -> NetworkDelta {
        let delta = match self.baseline {
            Some(prev) => NetworkDelta {
                tx: counters.tx_bytes - prev.tx_bytes,
                rx: counters.rx_bytes - prev.rx_bytes,
            },
            None => NetworkDelta { tx: 0, rx: 0 },
        };
        self.baseline = Some(counters);
        delta
    }
}
