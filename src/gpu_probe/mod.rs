// GPU utilization lookup: an ordered cascade of platform/vendor strategies.
//
// Vendors expose no common API, so each strategy shells out to the platform tool with its own
// short timeout. The first strategy that yields a reading wins; all failures collapse to `None`.

mod apple;
mod command;
mod nvidia;
mod wmic;

pub use apple::{IoregProbe, parse_ioreg_plist};
pub use nvidia::{NvidiaSmiProbe, parse_nvidia_csv};
pub use wmic::{GENERIC_NOTE, VideoControllerProbe, parse_video_controllers};

use crate::models::GpuInfo;
use futures_util::future::BoxFuture;
use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} timed out after {timeout:?}")]
    Timeout {
        program: &'static str,
        timeout: Duration,
    },
    #[error("{program} exited with {status}")]
    Exit {
        program: &'static str,
        status: ExitStatus,
    },
    #[error("unexpected output: {0}")]
    Parse(String),
    #[error("invalid plist: {0}")]
    Plist(#[from] plist::Error),
}

/// One way of reading the GPU. Implementations must not panic and must bound their own runtime.
pub trait GpuProbe: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_probe(&self) -> BoxFuture<'_, Option<GpuInfo>>;
}

pub struct GpuProbeChain {
    probes: Vec<Box<dyn GpuProbe>>,
}

impl GpuProbeChain {
    pub fn new(probes: Vec<Box<dyn GpuProbe>>) -> Self {
        Self { probes }
    }

    /// The strategies that apply to the OS this binary was built for.
    pub fn for_current_platform(timeout: Duration) -> Self {
        #[cfg(target_os = "macos")]
        let probes: Vec<Box<dyn GpuProbe>> = vec![Box::new(IoregProbe::new(timeout))];
        #[cfg(target_os = "linux")]
        let probes: Vec<Box<dyn GpuProbe>> = vec![Box::new(NvidiaSmiProbe::new(timeout))];
        #[cfg(target_os = "windows")]
        let probes: Vec<Box<dyn GpuProbe>> = vec![
            Box::new(NvidiaSmiProbe::new(timeout)),
            Box::new(VideoControllerProbe::new(timeout)),
        ];
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let probes: Vec<Box<dyn GpuProbe>> = {
            let _ = timeout;
            Vec::new()
        };
        Self::new(probes)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Tries each strategy in order and stops at the first reading.
    pub async fn probe(&self) -> Option<GpuInfo> {
        for probe in &self.probes {
            if let Some(info) = probe.try_probe().await {
                tracing::trace!(probe = probe.name(), model = %info.model, "GPU probe succeeded");
                return Some(info);
            }
        }
        None
    }
}

/// Collapses a strategy result into the cascade's `Option`, logging why it failed.
pub(crate) fn probe_outcome(
    probe: &'static str,
    result: Result<GpuInfo, ProbeError>,
) -> Option<GpuInfo> {
    match result {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!(probe, error = %e, "GPU probe failed");
            None
        }
    }
}
