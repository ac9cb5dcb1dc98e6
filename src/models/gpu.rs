// GPU models

use serde::{Deserialize, Serialize};

/// One GPU reading. Vendor-specific fields are flattened next to `model` and `utilization`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub model: String,
    pub utilization: f64,
    #[serde(flatten)]
    pub details: GpuDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GpuDetails {
    Apple {
        cores: u64,
        renderer_utilization: f64,
        tiler_utilization: f64,
    },
    /// Memory figures are in MiB, as reported by `nvidia-smi`.
    Nvidia { memory_used: f64, memory_total: f64 },
    /// Low-confidence reading: model name only, utilization unknown.
    Generic { note: String },
}
