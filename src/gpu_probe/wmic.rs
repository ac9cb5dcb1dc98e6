// Generic Windows fallback: video controller name from `wmic`, utilization unknown.

use futures_util::future::BoxFuture;
use std::time::Duration;

use super::command::run_with_timeout;
use super::{GpuProbe, ProbeError, probe_outcome};
use crate::models::{GpuDetails, GpuInfo};

const PROGRAM: &str = "wmic";
const ARGS: &[&str] = &["path", "win32_VideoController", "get", "name"];
pub const GENERIC_NOTE: &str = "Generic Windows GPU detection";

pub struct VideoControllerProbe {
    timeout: Duration,
}

impl VideoControllerProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GpuProbe for VideoControllerProbe {
    fn name(&self) -> &'static str {
        "wmic"
    }

    fn try_probe(&self) -> BoxFuture<'_, Option<GpuInfo>> {
        Box::pin(async move {
            let parsed = run_with_timeout(PROGRAM, ARGS, self.timeout)
                .await
                .and_then(|stdout| parse_video_controllers(&stdout));
            probe_outcome(self.name(), parsed)
        })
    }
}

/// Takes the first non-blank line after the `Name` header as the GPU model.
pub fn parse_video_controllers(output: &str) -> Result<GpuInfo, ProbeError> {
    let model = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find(|l| !l.eq_ignore_ascii_case("name"))
        .ok_or_else(|| ProbeError::Parse("no video controller listed".into()))?;

    Ok(GpuInfo {
        model: model.to_string(),
        utilization: 0.0,
        details: GpuDetails::Generic {
            note: GENERIC_NOTE.into(),
        },
    })
}
