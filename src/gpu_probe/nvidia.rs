// NVIDIA GPUs via nvidia-smi (Linux and Windows).

use futures_util::future::BoxFuture;
use std::time::Duration;

use super::command::run_with_timeout;
use super::{GpuProbe, ProbeError, probe_outcome};
use crate::models::{GpuDetails, GpuInfo};

const PROGRAM: &str = "nvidia-smi";
const ARGS: &[&str] = &[
    "--query-gpu=name,utilization.gpu,memory.used,memory.total",
    "--format=csv,noheader,nounits",
];

pub struct NvidiaSmiProbe {
    timeout: Duration,
}

impl NvidiaSmiProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GpuProbe for NvidiaSmiProbe {
    fn name(&self) -> &'static str {
        "nvidia-smi"
    }

    fn try_probe(&self) -> BoxFuture<'_, Option<GpuInfo>> {
        Box::pin(async move {
            let parsed = run_with_timeout(PROGRAM, ARGS, self.timeout)
                .await
                .and_then(|stdout| parse_nvidia_csv(&stdout));
            probe_outcome(self.name(), parsed)
        })
    }
}

/// Parses the first line of `name,utilization,memory.used,memory.total`.
///
/// Name and a numeric utilization are required; missing or unparsable memory fields read as 0.
pub fn parse_nvidia_csv(output: &str) -> Result<GpuInfo, ProbeError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| ProbeError::Parse("empty nvidia-smi output".into()))?;

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(ProbeError::Parse(format!(
            "expected at least 2 fields, got {}: {:?}",
            parts.len(),
            line
        )));
    }

    let utilization = parts[1]
        .parse::<f64>()
        .map_err(|e| ProbeError::Parse(format!("utilization {:?}: {}", parts[1], e)))?;
    let field = |i: usize| {
        parts
            .get(i)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    Ok(GpuInfo {
        model: parts[0].to_string(),
        utilization,
        details: GpuDetails::Nvidia {
            memory_used: field(2),
            memory_total: field(3),
        },
    })
}
