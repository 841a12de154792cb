// Linux-specific helpers: /proc/cpuinfo, /sys/class/net counters.

/// Read the first "cpu MHz" value from /proc/cpuinfo (Linux). Used when
/// sysinfo reports a zero frequency.
pub(super) fn read_cpu_mhz() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("cpu MHz") {
                let v = line.find(':').map(|i| line[i + 1..].trim())?;
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

/// Read cumulative tx/rx byte counters from
/// /sys/class/net/<interface>/statistics (Linux).
pub(super) fn read_net_counters(interface: &str) -> Option<(i64, i64)> {
    #[cfg(target_os = "linux")]
    {
        let base = format!("/sys/class/net/{}/statistics", interface);
        let tx = std::fs::read_to_string(format!("{}/tx_bytes", base)).ok()?;
        let rx = std::fs::read_to_string(format!("{}/rx_bytes", base)).ok()?;
        Some((tx.trim().parse().ok()?, rx.trim().parse().ok()?))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface;
        None
    }
}
