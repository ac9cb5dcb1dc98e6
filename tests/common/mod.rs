// Shared test helpers: fixed snapshots and a recording datagram sink

#![allow(dead_code)]

use futures_util::future::BoxFuture;
use pcstats::broadcaster::DatagramSink;
use pcstats::collector::StatsSource;
use pcstats::models::*;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub fn sample_snapshot(cpu: f64, memory: f64, gpu: Option<f64>) -> Snapshot {
    Snapshot::from_parts(
        CpuStats {
            percent: cpu,
            logical_count: 8,
            frequency: Some(CpuFrequency {
                current: 2400.0,
                min: 800.0,
                max: 3600.0,
            }),
        },
        MemoryStats {
            total: 16 * 1024 * 1024 * 1024,
            available: 8 * 1024 * 1024 * 1024,
            used: 8 * 1024 * 1024 * 1024,
            percent: memory,
        },
        gpu.map(|utilization| GpuInfo {
            model: "NVIDIA X".into(),
            utilization,
            details: GpuDetails::Nvidia {
                memory_used: 1024.0,
                memory_total: 4096.0,
            },
        }),
        DiskStats::default(),
        NetworkStats::default(),
    )
}

/// Always returns the same snapshot, instantly.
pub struct FixedSource(pub Snapshot);

impl StatsSource for FixedSource {
    fn collect(&self) -> BoxFuture<'_, Snapshot> {
        let snapshot = self.0.clone();
        Box::pin(async move { snapshot })
    }
}

/// Takes `delay` to produce each snapshot, like a collection stuck on a GPU tool timeout.
pub struct SlowSource {
    pub snapshot: Snapshot,
    pub delay: std::time::Duration,
}

impl StatsSource for SlowSource {
    fn collect(&self) -> BoxFuture<'_, Snapshot> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.snapshot.clone()
        })
    }
}

#[derive(Default)]
struct Recorded {
    attempts: Vec<(SocketAddr, Vec<u8>)>,
    failures_remaining: usize,
}

/// Records every send attempt; the first `n` attempts can be made to fail.
#[derive(Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(n: usize) -> Self {
        let sink = Self::default();
        sink.inner.lock().unwrap().failures_remaining = n;
        sink
    }

    pub fn attempts(&self) -> Vec<(SocketAddr, Vec<u8>)> {
        self.inner.lock().unwrap().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.inner.lock().unwrap().attempts.len()
    }
}

impl DatagramSink for RecordingSink {
    fn send_to<'a>(
        &'a self,
        buf: &'a [u8],
        target: SocketAddr,
    ) -> BoxFuture<'a, io::Result<usize>> {
        let mut recorded = self.inner.lock().unwrap();
        recorded.attempts.push((target, buf.to_vec()));
        let result = if recorded.failures_remaining > 0 {
            recorded.failures_remaining -= 1;
            Err(io::Error::other("network unreachable"))
        } else {
            Ok(buf.len())
        };
        Box::pin(async move { result })
    }
}

/// Polls `condition` every 5ms until it holds or `timeout_ms` elapses.
pub async fn wait_until(timeout_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }
    condition()
}
