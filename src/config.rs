use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub probe: ProbeConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 2468,
            host: "0.0.0.0".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Admission cap: the max number of concurrently open viewer sessions.
    pub max_connections: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeTarget {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Host every target port is probed on.
    pub host: String,
    pub timeout_ms: u64,
    pub targets: Vec<ProbeTarget>,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let targets = [
            ("HTTP", 80),
            ("HTTPS", 443),
            ("FTP", 21),
            ("POP3", 110),
            ("SMTP", 25),
            ("MySQL", 3306),
        ]
        .into_iter()
        .map(|(name, port)| ProbeTarget {
            name: name.into(),
            port,
        })
        .collect();
        Self {
            host: "localhost".into(),
            timeout_ms: 2500,
            targets,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Network interface whose cumulative byte counters feed tx/rx deltas.
    pub interface: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            interface: "eth0".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Lowers the default log filter from info to debug.
    pub debug: bool,
}

impl AppConfig {
    /// Load from CONFIG_FILE (default config.toml); a missing file means
    /// built-in defaults, any other read error is fatal.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.session.max_connections > 0,
            "session.max_connections must be > 0, got {}",
            self.session.max_connections
        );
        anyhow::ensure!(!self.probe.host.is_empty(), "probe.host must be non-empty");
        anyhow::ensure!(
            self.probe.timeout_ms > 0,
            "probe.timeout_ms must be > 0, got {}",
            self.probe.timeout_ms
        );
        anyhow::ensure!(
            !self.probe.targets.is_empty(),
            "probe.targets must list at least one target"
        );
        anyhow::ensure!(
            !self.metrics.interface.is_empty(),
            "metrics.interface must be non-empty"
        );
        Ok(())
    }
}
