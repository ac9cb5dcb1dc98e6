// CPU and memory models

use serde::{Deserialize, Serialize};

/// CPU reading. `percent` is sampled over a short interval, not instantaneous.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    pub percent: f64,
    #[serde(rename = "count")]
    pub logical_count: u32,
    #[serde(rename = "freq")]
    pub frequency: Option<CpuFrequency>,
}

/// Clock frequencies in MHz. `min`/`max` are 0 when the platform does not report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuFrequency {
    pub current: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
}

impl MemoryStats {
    /// Builds memory stats from total/available bytes; `used` is what is not available.
    pub fn from_totals(total: u64, available: u64) -> Self {
        let used = total.saturating_sub(available);
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            total,
            available,
            used,
            percent,
        }
    }
}
