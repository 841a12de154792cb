// Host metrics behind a trait; default implementation via sysinfo

mod linux;

use crate::models::{DriveUsage, LoadAverage, NetworkCounters};
use sysinfo::{Networks, System};

/// Raw host readings consumed by the snapshot collector.
///
/// Methods are sync and called from blocking context (`spawn_blocking`);
/// implementations must not assume an async runtime. Each read stands
/// alone: one failing method never poisons the others.
pub trait HostMetricsSource: Send + Sync {
    fn cpu_count(&self) -> anyhow::Result<usize>;
    fn load_average(&self) -> anyhow::Result<LoadAverage>;
    fn cpu_mhz(&self) -> anyhow::Result<String>;
    fn uptime_seconds(&self) -> anyhow::Result<u64>;
    fn mem_total_kb(&self) -> anyhow::Result<u64>;
    fn mem_free_kb(&self) -> anyhow::Result<u64>;
    fn disk_usage(&self) -> anyhow::Result<Vec<DriveUsage>>;
    fn network_counters(&self, interface: &str) -> anyhow::Result<NetworkCounters>;
}

/// Default source backed by the sysinfo crate, with raw /sys and /proc
/// fallbacks on Linux where sysinfo is weak.
pub struct SysinfoSource {
    sys: std::sync::Mutex<System>,
    networks: std::sync::Mutex<Networks>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: std::sync::Mutex::new(sys),
            networks: std::sync::Mutex::new(networks),
        }
    }

    fn lock_sys(&self) -> anyhow::Result<std::sync::MutexGuard<'_, System>> {
        self.sys
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))
    }
}

impl HostMetricsSource for SysinfoSource {
    fn cpu_count(&self) -> anyhow::Result<usize> {
        let sys = self.lock_sys()?;
        let n = sys.cpus().len();
        anyhow::ensure!(n > 0, "no cpus reported");
        Ok(n)
    }

    fn load_average(&self) -> anyhow::Result<LoadAverage> {
        let la = System::load_average();
        Ok(LoadAverage {
            now: format!("{:.2}", la.one),
            five: format!("{:.2}", la.five),
            fifteen: format!("{:.2}", la.fifteen),
        })
    }

    fn cpu_mhz(&self) -> anyhow::Result<String> {
        let sys = self.lock_sys()?;
        let freq = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0);
        if freq > 0 {
            return Ok(freq.to_string());
        }
        linux::read_cpu_mhz().ok_or_else(|| anyhow::anyhow!("cpu frequency unavailable"))
    }

    fn uptime_seconds(&self) -> anyhow::Result<u64> {
        Ok(System::uptime())
    }

    fn mem_total_kb(&self) -> anyhow::Result<u64> {
        let mut sys = self.lock_sys()?;
        sys.refresh_memory();
        Ok(sys.total_memory() / 1024)
    }

    fn mem_free_kb(&self) -> anyhow::Result<u64> {
        let mut sys = self.lock_sys()?;
        sys.refresh_memory();
        Ok(sys.free_memory() / 1024)
    }

    fn disk_usage(&self) -> anyhow::Result<Vec<DriveUsage>> {
        let output = std::process::Command::new("df")
            .args(["-l", "--exclude-type=tmpfs", "--exclude-type=devtmpfs"])
            .output()?;
        anyhow::ensure!(output.status.success(), "df exited with {}", output.status);
        Ok(parse_df_output(&String::from_utf8_lossy(&output.stdout)))
    }

    fn network_counters(&self, interface: &str) -> anyhow::Result<NetworkCounters> {
        if let Some((tx_bytes, rx_bytes)) = linux::read_net_counters(interface) {
            return Ok(NetworkCounters { tx_bytes, rx_bytes });
        }
        let mut networks = self
            .networks
            .lock()
            .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
        networks.refresh(true);
        let data = networks
            .list()
            .get(interface)
            .ok_or_else(|| anyhow::anyhow!("no such interface: {}", interface))?;
        Ok(NetworkCounters {
            tx_bytes: data.total_transmitted() as i64,
            rx_bytes: data.total_received() as i64,
        })
    }
}

/// Filesystems never worth reporting even when df lets them through.
const VIRTUAL_FILESYSTEMS: &[&str] = &[
    "tmpfs", "devtmpfs", "udev", "overlay", "squashfs", "proc", "sysfs", "shm", "none", "efivarfs",
];

/// Parse df-style output into usage rows. Tolerates variable whitespace and
/// extra trailing fields, drops the header and malformed rows, and excludes
/// virtual filesystems by device name.
pub fn parse_df_output(text: &str) -> Vec<DriveUsage> {
    text.lines().filter_map(parse_df_line).collect()
}

/// A row is usable when it has a `NN%` field followed by a mount point.
/// The header's "Use%" fails the numeric check and falls out naturally.
fn parse_df_line(line: &str) -> Option<DriveUsage> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields
        .first()
        .is_some_and(|f| VIRTUAL_FILESYSTEMS.contains(f))
    {
        return None;
    }
    let at = fields.iter().position(|f| is_percent_field(f))?;
    let mount = fields.get(at + 1)?;
    Some(DriveUsage {
        percent: fields[at].to_string(),
        mount: (*mount).to_string(),
    })
}

fn is_percent_field(field: &str) -> bool {
    field
        .strip_suffix('%')
        .is_some_and(|n| n.parse::<u32>().is_ok())
}
