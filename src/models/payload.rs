// UDP wire payload

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::Normalized;

/// Datagram body sent to the receiver: `{"cpu", "mem", "gpu", "time"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub cpu: f64,
    pub mem: f64,
    pub gpu: f64,
    /// Local wall-clock time as `HH:MM:SS`.
    pub time: String,
}

impl TelemetryPayload {
    pub fn new(normalized: &Normalized, at: DateTime<Local>) -> Self {
        Self {
            cpu: normalized.cpu,
            mem: normalized.memory,
            gpu: normalized.gpu,
            time: at.format("%H:%M:%S").to_string(),
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
