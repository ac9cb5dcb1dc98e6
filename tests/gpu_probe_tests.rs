// GPU probe parsing and cascade tests

use futures_util::future::BoxFuture;
use pcstats::gpu_probe::*;
use pcstats::models::{GpuDetails, GpuInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// --- nvidia-smi CSV ---

#[test]
fn test_nvidia_csv_full_line() {
    let info = parse_nvidia_csv("NVIDIA X,45.0,1024,4096\n").unwrap();
    assert_eq!(
        info,
        GpuInfo {
            model: "NVIDIA X".into(),
            utilization: 45.0,
            details: GpuDetails::Nvidia {
                memory_used: 1024.0,
                memory_total: 4096.0,
            },
        }
    );
}

#[test]
fn test_nvidia_csv_trims_spaces_after_commas() {
    let info = parse_nvidia_csv("NVIDIA GeForce RTX 3080, 7, 512, 10240").unwrap();
    assert_eq!(info.model, "NVIDIA GeForce RTX 3080");
    assert_eq!(info.utilization, 7.0);
}

#[test]
fn test_nvidia_csv_rejects_fewer_than_two_fields() {
    assert!(parse_nvidia_csv("NVIDIA X").is_err());
    assert!(parse_nvidia_csv("").is_err());
    assert!(parse_nvidia_csv("\n\n").is_err());
}

#[test]
fn test_nvidia_csv_rejects_non_numeric_utilization() {
    let err = parse_nvidia_csv("NVIDIA X,[N/A],1024,4096").unwrap_err();
    assert!(matches!(err, ProbeError::Parse(_)));
}

#[test]
fn test_nvidia_csv_missing_memory_fields_default_to_zero() {
    let info = parse_nvidia_csv("NVIDIA X,45").unwrap();
    assert_eq!(
        info.details,
        GpuDetails::Nvidia {
            memory_used: 0.0,
            memory_total: 0.0,
        }
    );

    let info = parse_nvidia_csv("NVIDIA X,45,[N/A],4096").unwrap();
    assert_eq!(
        info.details,
        GpuDetails::Nvidia {
            memory_used: 0.0,
            memory_total: 4096.0,
        }
    );
}

#[test]
fn test_nvidia_csv_multi_gpu_uses_first_line() {
    let info = parse_nvidia_csv("GPU A,10,1,2\nGPU B,90,3,4\n").unwrap();
    assert_eq!(info.model, "GPU A");
    assert_eq!(info.utilization, 10.0);
}

// --- ioreg plist ---

const IOREG_OUTPUT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<array>
	<dict>
		<key>IOClass</key>
		<string>AGXAcceleratorG13X</string>
		<key>PerformanceStatistics</key>
		<dict>
			<key>Device Utilization %</key>
			<integer>37</integer>
			<key>Renderer Utilization %</key>
			<integer>35</integer>
			<key>Tiler Utilization %</key>
			<integer>12</integer>
			<key>In use system memory</key>
			<integer>123456789</integer>
		</dict>
		<key>gpu-core-count</key>
		<integer>8</integer>
		<key>model</key>
		<string>Apple M1</string>
	</dict>
</array>
</plist>
"#;

#[test]
fn test_ioreg_extracts_performance_statistics() {
    let info = parse_ioreg_plist(IOREG_OUTPUT).unwrap();
    assert_eq!(
        info,
        GpuInfo {
            model: "Apple M1".into(),
            utilization: 37.0,
            details: GpuDetails::Apple {
                cores: 8,
                renderer_utilization: 35.0,
                tiler_utilization: 12.0,
            },
        }
    );
}

#[test]
fn test_ioreg_missing_keys_default_to_zero() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<array>
	<dict>
		<key>IOClass</key>
		<string>AGXAccelerator</string>
	</dict>
	<dict>
		<key>PerformanceStatistics</key>
		<dict>
			<key>Device Utilization %</key>
			<real>5.5</real>
		</dict>
	</dict>
</array>
</plist>
"#;
    let info = parse_ioreg_plist(xml).unwrap();
    assert_eq!(info.model, "Apple Silicon GPU");
    assert_eq!(info.utilization, 5.5);
    assert_eq!(
        info.details,
        GpuDetails::Apple {
            cores: 0,
            renderer_utilization: 0.0,
            tiler_utilization: 0.0,
        }
    );
}

#[test]
fn test_ioreg_without_statistics_fails() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<array>
	<dict>
		<key>IOClass</key>
		<string>AGXAccelerator</string>
	</dict>
</array>
</plist>
"#;
    assert!(matches!(parse_ioreg_plist(xml), Err(ProbeError::Parse(_))));
}

#[test]
fn test_ioreg_garbage_fails() {
    assert!(parse_ioreg_plist("<plist><dict><key>broken").is_err());
}

// --- wmic ---

#[test]
fn test_wmic_takes_first_controller_after_header() {
    let output = "Name  \r\r\nNVIDIA GeForce GTX 1060  \r\r\nIntel(R) UHD Graphics 630\r\r\n\r\r\n";
    let info = parse_video_controllers(output).unwrap();
    assert_eq!(info.model, "NVIDIA GeForce GTX 1060");
    assert_eq!(info.utilization, 0.0);
    assert_eq!(
        info.details,
        GpuDetails::Generic {
            note: GENERIC_NOTE.into()
        }
    );
}

#[test]
fn test_wmic_header_only_fails() {
    assert!(parse_video_controllers("Name\r\n\r\n").is_err());
    assert!(parse_video_controllers("").is_err());
}

// --- cascade ---

struct FakeProbe {
    result: Option<GpuInfo>,
    calls: Arc<AtomicUsize>,
}

impl GpuProbe for FakeProbe {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn try_probe(&self) -> BoxFuture<'_, Option<GpuInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

fn generic(model: &str) -> GpuInfo {
    GpuInfo {
        model: model.into(),
        utilization: 0.0,
        details: GpuDetails::Generic {
            note: "test".into(),
        },
    }
}

#[tokio::test]
async fn cascade_stops_at_first_success() {
    let calls: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let chain = GpuProbeChain::new(vec![
        Box::new(FakeProbe {
            result: None,
            calls: calls[0].clone(),
        }),
        Box::new(FakeProbe {
            result: Some(generic("second")),
            calls: calls[1].clone(),
        }),
        Box::new(FakeProbe {
            result: Some(generic("third")),
            calls: calls[2].clone(),
        }),
    ]);

    let info = chain.probe().await.unwrap();
    assert_eq!(info.model, "second");
    assert_eq!(calls[0].load(Ordering::SeqCst), 1);
    assert_eq!(calls[1].load(Ordering::SeqCst), 1);
    assert_eq!(calls[2].load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cascade_with_all_failures_is_none() {
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = GpuProbeChain::new(vec![
        Box::new(FakeProbe {
            result: None,
            calls: calls.clone(),
        }),
        Box::new(FakeProbe {
            result: None,
            calls: calls.clone(),
        }),
    ]);
    assert!(chain.probe().await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_cascade_is_none() {
    let chain = GpuProbeChain::new(vec![]);
    assert!(chain.is_empty());
    assert!(chain.probe().await.is_none());
}

#[test]
fn test_platform_chain_matches_os() {
    let chain = GpuProbeChain::for_current_platform(std::time::Duration::from_secs(2));
    let expected = if cfg!(target_os = "windows") {
        2
    } else if cfg!(any(target_os = "linux", target_os = "macos")) {
        1
    } else {
        0
    };
    assert_eq!(chain.len(), expected);
}
