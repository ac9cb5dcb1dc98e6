use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub broadcast: BroadcastConfig,
    pub discovery: DiscoveryConfig,
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".into(),
            port: 58008,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// UDP port the receiver listens on.
    pub port: u16,
    pub interval_ms: u64,
    /// Destination used while no receiver has been discovered.
    pub broadcast_address: IpAddr,
    /// Local address the sending socket binds to.
    pub bind_address: String,
    /// Minimum spacing between repeated send-failure warnings.
    pub failure_log_interval_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            port: 8266,
            interval_ms: 500,
            broadcast_address: IpAddr::V4(Ipv4Addr::BROADCAST),
            bind_address: "0.0.0.0:0".into(),
            failure_log_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub enabled: bool,
    pub service_type: String,
    /// Buffered discovery events between the mDNS daemon and the listener task.
    pub channel_capacity: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_type: "_getPcStats._udp.local.".into(),
            channel_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub cpu_sample_interval_ms: u64,
    /// Per-command timeout for external GPU tools.
    pub probe_timeout_ms: u64,
    /// Path whose filesystem is reported under `disk.usage`.
    pub disk_path: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            cpu_sample_interval_ms: 100,
            probe_timeout_ms: 2000,
            disk_path: PathBuf::from(if cfg!(windows) { "C:\\" } else { "/" }),
        }
    }
}

impl CollectorConfig {
    pub fn cpu_sample_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl AppConfig {
    /// Loads `CONFIG_FILE` (required to exist when set) or `config.toml` (defaults when absent).
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
                    let config = AppConfig::default();
                    config.validate()?;
                    Ok(config)
                }
                Err(e) => Err(e.into()),
            },
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
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.broadcast.port > 0,
            "broadcast.port must be between 1 and 65535, got {}",
            self.broadcast.port
        );
        anyhow::ensure!(
            self.broadcast.interval_ms > 0,
            "broadcast.interval_ms must be > 0, got {}",
            self.broadcast.interval_ms
        );
        anyhow::ensure!(
            self.broadcast.bind_address.parse::<SocketAddr>().is_ok(),
            "broadcast.bind_address must be a socket address, got {:?}",
            self.broadcast.bind_address
        );
        anyhow::ensure!(
            self.broadcast.failure_log_interval_secs > 0,
            "broadcast.failure_log_interval_secs must be > 0, got {}",
            self.broadcast.failure_log_interval_secs
        );
        anyhow::ensure!(
            self.discovery.service_type.starts_with('_')
                && self.discovery.service_type.ends_with(".local."),
            "discovery.service_type must look like \"_<app>._udp.local.\", got {:?}",
            self.discovery.service_type
        );
        anyhow::ensure!(
            self.discovery.channel_capacity > 0,
            "discovery.channel_capacity must be > 0, got {}",
            self.discovery.channel_capacity
        );
        anyhow::ensure!(
            self.collector.cpu_sample_interval_ms > 0,
            "collector.cpu_sample_interval_ms must be > 0, got {}",
            self.collector.cpu_sample_interval_ms
        );
        anyhow::ensure!(
            self.collector.probe_timeout_ms > 0 && self.collector.probe_timeout_ms <= 10_000,
            "collector.probe_timeout_ms must be between 1 and 10000, got {}",
            self.collector.probe_timeout_ms
        );
        anyhow::ensure!(
            !self.collector.disk_path.as_os_str().is_empty(),
            "collector.disk_path must be non-empty"
        );
        Ok(())
    }
}
