// Fixed-interval telemetry sender: snapshot -> payload -> one datagram to the current target.

use crate::collector::StatsSource;
use crate::models::TelemetryPayload;
use crate::target::TargetResolver;
use futures_util::future::BoxFuture;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Outbound datagram transport. Implemented by `UdpSocket`; tests substitute recorders.
pub trait DatagramSink: Send + Sync {
    fn send_to<'a>(&'a self, buf: &'a [u8], target: SocketAddr)
    -> BoxFuture<'a, io::Result<usize>>;
}

impl DatagramSink for UdpSocket {
    fn send_to<'a>(
        &'a self,
        buf: &'a [u8],
        target: SocketAddr,
    ) -> BoxFuture<'a, io::Result<usize>> {
        Box::pin(UdpSocket::send_to(self, buf, target))
    }
}

/// Binds the sending socket with SO_BROADCAST enabled.
pub async fn bind_socket(bind_address: &str) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(bind_address).await?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

/// Collaborators and shutdown for the send loop.
pub struct BroadcasterDeps<S> {
    pub source: Arc<dyn StatsSource>,
    pub resolver: Arc<TargetResolver>,
    pub sink: S,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct BroadcasterConfig {
    pub port: u16,
    pub interval_ms: u64,
    /// Minimum spacing between send-failure warnings; failures in between log at debug.
    pub failure_log_interval_secs: u64,
}

/// Spawns the send loop. The loop owns `sink` and drops it when shutdown is signalled.
pub fn spawn<S>(deps: BroadcasterDeps<S>, config: BroadcasterConfig) -> tokio::task::JoinHandle<()>
where
    S: DatagramSink + 'static,
{
    let span = tracing::debug_span!("broadcaster", port = config.port, interval_ms = config.interval_ms);
    tokio::spawn(run(deps, config).instrument(span))
}

async fn run<S: DatagramSink>(deps: BroadcasterDeps<S>, config: BroadcasterConfig) {
    let BroadcasterDeps {
        source,
        resolver,
        sink,
        mut shutdown_rx,
    } = deps;
    let BroadcasterConfig {
        port,
        interval_ms,
        failure_log_interval_secs,
    } = config;
    let failure_log_interval = Duration::from_secs(failure_log_interval_secs);

    let mut tick = interval(Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut consecutive_failures: u64 = 0;
    let mut last_failure_warn: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            _ = tick.tick() => {}
        }
        // A collection can run for seconds (CPU sampling, GPU tool timeouts); shutdown preempts it.
        let snapshot = tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            snapshot = source.collect() => snapshot,
        };

        let payload = TelemetryPayload::new(&snapshot.normalized, chrono::Local::now());
        let message = match payload.to_bytes() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, operation = "encode_payload", "payload serialization failed");
                continue;
            }
        };

        let target = SocketAddr::new(resolver.current(), port);
        match sink.send_to(&message, target).await {
            Ok(sent) => {
                if consecutive_failures > 0 {
                    tracing::info!(%target, consecutive_failures, "Broadcast recovered");
                    consecutive_failures = 0;
                }
                tracing::debug!(
                    %target,
                    bytes = sent,
                    cpu = payload.cpu,
                    mem = payload.mem,
                    gpu = payload.gpu,
                    "telemetry sent"
                );
            }
            Err(e) => {
                consecutive_failures += 1;
                let should_warn =
                    last_failure_warn.is_none_or(|t| t.elapsed() >= failure_log_interval);
                if should_warn {
                    tracing::warn!(
                        error = %e,
                        %target,
                        consecutive_failures,
                        operation = "send_to",
                        "Broadcast error"
                    );
                    last_failure_warn = Some(Instant::now());
                } else {
                    tracing::debug!(error = %e, %target, "Broadcast error");
                }
            }
        }
    }
    tracing::debug!("Broadcaster shutting down");
}
