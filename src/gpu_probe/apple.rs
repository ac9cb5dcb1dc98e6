// Apple Silicon GPUs via `ioreg` (macOS).

use futures_util::future::BoxFuture;
use plist::{Dictionary, Value};
use std::io::Cursor;
use std::time::Duration;

use super::command::run_with_timeout;
use super::{GpuProbe, ProbeError, probe_outcome};
use crate::models::{GpuDetails, GpuInfo};

const PROGRAM: &str = "ioreg";
const ARGS: &[&str] = &["-r", "-c", "AGXAccelerator", "-a"];
const DEFAULT_MODEL: &str = "Apple Silicon GPU";

pub struct IoregProbe {
    timeout: Duration,
}

impl IoregProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GpuProbe for IoregProbe {
    fn name(&self) -> &'static str {
        "ioreg"
    }

    fn try_probe(&self) -> BoxFuture<'_, Option<GpuInfo>> {
        Box::pin(async move {
            let parsed = run_with_timeout(PROGRAM, ARGS, self.timeout)
                .await
                .and_then(|stdout| parse_ioreg_plist(&stdout));
            probe_outcome(self.name(), parsed)
        })
    }
}

/// Extracts the first accelerator entry carrying `PerformanceStatistics` from `ioreg -a` output.
pub fn parse_ioreg_plist(output: &str) -> Result<GpuInfo, ProbeError> {
    let root = Value::from_reader(Cursor::new(output.as_bytes()))?;
    let entries: Vec<&Dictionary> = match &root {
        Value::Array(items) => items.iter().filter_map(Value::as_dictionary).collect(),
        Value::Dictionary(d) => vec![d],
        _ => Vec::new(),
    };

    let (entry, stats) = entries
        .into_iter()
        .find_map(|entry| {
            entry
                .get("PerformanceStatistics")
                .and_then(Value::as_dictionary)
                .map(|stats| (entry, stats))
        })
        .ok_or_else(|| ProbeError::Parse("no entry with PerformanceStatistics".into()))?;

    let model = entry
        .get("model")
        .and_then(Value::as_string)
        .unwrap_or(DEFAULT_MODEL)
        .to_string();

    Ok(GpuInfo {
        model,
        utilization: number(stats, "Device Utilization %"),
        details: GpuDetails::Apple {
            cores: number(entry, "gpu-core-count").max(0.0) as u64,
            renderer_utilization: number(stats, "Renderer Utilization %"),
            tiler_utilization: number(stats, "Tiler Utilization %"),
        },
    })
}

fn number(dict: &Dictionary, key: &str) -> f64 {
    dict.get(key)
        .and_then(|v| {
            v.as_real()
                .or_else(|| v.as_signed_integer().map(|i| i as f64))
                .or_else(|| v.as_unsigned_integer().map(|u| u as f64))
        })
        .unwrap_or(0.0)
}
