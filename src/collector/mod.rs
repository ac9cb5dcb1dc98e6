// Stats collection via sysinfo plus the GPU probe cascade.
//
// Every step builds its own sysinfo reader, so the collector holds no mutable state and can be
// called from the broadcaster and HTTP handlers at the same time.

mod linux;

use crate::config::CollectorConfig;
use crate::gpu_probe::GpuProbeChain;
use crate::models::*;
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, Networks, System};
use tracing::instrument;

/// Anything that can produce a snapshot on demand. Lets the broadcaster and the HTTP layer run
/// against a fixed source in tests.
pub trait StatsSource: Send + Sync {
    fn collect(&self) -> BoxFuture<'_, Snapshot>;
}

pub struct StatsCollector {
    gpu: GpuProbeChain,
    cpu_sample_interval: Duration,
    disk_path: PathBuf,
}

impl StatsCollector {
    pub fn new(config: &CollectorConfig) -> Self {
        Self::with_gpu_probes(
            config,
            GpuProbeChain::for_current_platform(config.probe_timeout()),
        )
    }

    pub fn with_gpu_probes(config: &CollectorConfig, gpu: GpuProbeChain) -> Self {
        Self {
            gpu,
            cpu_sample_interval: config.cpu_sample_interval(),
            disk_path: config.disk_path.clone(),
        }
    }

    /// Reads every subsystem and never fails: a step that errors leaves its field at the
    /// default value. Takes at least the CPU sampling interval.
    pub async fn collect(&self) -> Snapshot {
        let (cpu, memory, gpu, disk, network) = tokio::join!(
            self.read_cpu(),
            self.read_memory(),
            self.read_gpu(),
            self.read_disk(),
            self.read_network(),
        );
        assemble(cpu, memory, gpu, disk, network)
    }

    #[instrument(skip(self), fields(operation = "read_cpu"))]
    pub async fn read_cpu(&self) -> anyhow::Result<CpuStats> {
        let interval = self.cpu_sample_interval;
        tokio::task::spawn_blocking(move || {
            let mut sys = System::new();
            sys.refresh_cpu_usage();
            std::thread::sleep(interval);
            sys.refresh_cpu_usage();
            sys.refresh_cpu_frequency();

            let cpus = sys.cpus();
            anyhow::ensure!(!cpus.is_empty(), "no CPUs reported");

            let current =
                cpus.iter().map(|c| c.frequency() as f64).sum::<f64>() / cpus.len() as f64;
            let frequency = (current > 0.0).then(|| {
                let (min, max) = linux::read_cpu_freq_limits().unwrap_or((0.0, 0.0));
                CpuFrequency { current, min, max }
            });

            Ok(CpuStats {
                percent: f64::from(sys.global_cpu_usage()).clamp(0.0, 100.0),
                logical_count: cpus.len() as u32,
                frequency,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("cpu task join: {}", e))?
    }

    #[instrument(skip(self), fields(operation = "read_memory"))]
    pub async fn read_memory(&self) -> anyhow::Result<MemoryStats> {
        tokio::task::spawn_blocking(|| {
            let mut sys = System::new();
            sys.refresh_memory();
            let total = sys.total_memory();
            anyhow::ensure!(total > 0, "total memory reported as 0");
            Ok(MemoryStats::from_totals(total, sys.available_memory()))
        })
        .await
        .map_err(|e| anyhow::anyhow!("memory task join: {}", e))?
    }

    #[instrument(skip(self), fields(operation = "read_gpu"))]
    pub async fn read_gpu(&self) -> Option<GpuInfo> {
        self.gpu.probe().await
    }

    #[instrument(skip(self), fields(operation = "read_disk"))]
    pub async fn read_disk(&self) -> anyhow::Result<DiskStats> {
        let disk_path = self.disk_path.clone();
        tokio::task::spawn_blocking(move || {
            let disks = Disks::new_with_refreshed_list();
            let list = disks.list();

            let usage = list
                .iter()
                .filter(|d| disk_path.starts_with(d.mount_point()))
                .max_by_key(|d| mount_depth(d.mount_point()))
                .map(|d| DiskUsage::from_space(d.total_space(), d.available_space()));

            let io = (!list.is_empty()).then(|| {
                list.iter().fold(DiskIo::default(), |acc, d| {
                    let u = d.usage();
                    DiskIo {
                        read_bytes: acc.read_bytes.saturating_add(u.total_read_bytes),
                        write_bytes: acc.write_bytes.saturating_add(u.total_written_bytes),
                    }
                })
            });

            Ok(DiskStats { usage, io })
        })
        .await
        .map_err(|e| anyhow::anyhow!("disk task join: {}", e))?
    }

    #[instrument(skip(self), fields(operation = "read_network"))]
    pub async fn read_network(&self) -> anyhow::Result<NetworkStats> {
        tokio::task::spawn_blocking(|| {
            let networks = Networks::new_with_refreshed_list();
            let list = networks.list();
            let io = (!list.is_empty()).then(|| {
                list.values().fold(NetworkIo::default(), |acc, data| NetworkIo {
                    bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                    bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
                    packets_sent: acc
                        .packets_sent
                        .saturating_add(data.total_packets_transmitted()),
                    packets_recv: acc
                        .packets_recv
                        .saturating_add(data.total_packets_received()),
                    errin: acc.errin.saturating_add(data.total_errors_on_received()),
                    errout: acc.errout.saturating_add(data.total_errors_on_transmitted()),
                })
            });
            Ok(NetworkStats { io })
        })
        .await
        .map_err(|e| anyhow::anyhow!("network task join: {}", e))?
    }
}

impl StatsSource for StatsCollector {
    fn collect(&self) -> BoxFuture<'_, Snapshot> {
        Box::pin(StatsCollector::collect(self))
    }
}

/// Builds the snapshot from per-step results; a failed step contributes its default.
pub(crate) fn assemble(
    cpu: anyhow::Result<CpuStats>,
    memory: anyhow::Result<MemoryStats>,
    gpu: Option<GpuInfo>,
    disk: anyhow::Result<DiskStats>,
    network: anyhow::Result<NetworkStats>,
) -> Snapshot {
    Snapshot::from_parts(
        or_default(cpu, "read_cpu"),
        or_default(memory, "read_memory"),
        gpu,
        or_default(disk, "read_disk"),
        or_default(network, "read_network"),
    )
}

fn or_default<T: Default>(result: anyhow::Result<T>, operation: &'static str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation, "stats step failed, using default");
        T::default()
    })
}

fn mount_depth(mount: &Path) -> usize {
    mount.components().count()
}
