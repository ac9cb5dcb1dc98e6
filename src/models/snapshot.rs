// Snapshot and its normalized projection

use serde::{Deserialize, Serialize};

use super::{CpuStats, DiskStats, GpuInfo, MemoryStats, NetworkStats};

/// One complete telemetry reading. Every outer field is always present; subsystems that could
/// not be read carry their default value instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub gpu: Option<GpuInfo>,
    pub disk: DiskStats,
    pub network: NetworkStats,
    pub normalized: Normalized,
}

/// The 0-100 values actually transmitted to the receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub cpu: f64,
    pub memory: f64,
    pub gpu: f64,
}

impl Normalized {
    pub fn from_readings(cpu: &CpuStats, memory: &MemoryStats, gpu: Option<&GpuInfo>) -> Self {
        Self {
            cpu: clamp_percent(cpu.percent),
            memory: clamp_percent(memory.percent),
            gpu: gpu.map(|g| clamp_percent(g.utilization)).unwrap_or(0.0),
        }
    }
}

impl Snapshot {
    /// Assembles a snapshot from per-subsystem readings and derives `normalized` from them.
    pub fn from_parts(
        cpu: CpuStats,
        memory: MemoryStats,
        gpu: Option<GpuInfo>,
        disk: DiskStats,
        network: NetworkStats,
    ) -> Self {
        let normalized = Normalized::from_readings(&cpu, &memory, gpu.as_ref());
        Self {
            cpu,
            memory,
            gpu,
            disk,
            network,
            normalized,
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
