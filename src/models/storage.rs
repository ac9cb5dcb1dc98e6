// Disk models

use serde::{Deserialize, Serialize};

/// Space usage of the filesystem holding the configured disk path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl DiskUsage {
    pub fn from_space(total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            total,
            used,
            free,
            percent,
        }
    }
}

/// Cumulative read/write byte counters summed over all disks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskIo {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub usage: Option<DiskUsage>,
    pub io: Option<DiskIo>,
}
