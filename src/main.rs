use anyhow::Result;
use pcstats::*;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let collector = Arc::new(collector::StatsCollector::new(&app_config.collector));
    let resolver = Arc::new(target::TargetResolver::new(
        app_config.broadcast.broadcast_address,
    ));

    // Discovery is optional: without it the resolver simply stays in broadcast mode.
    let mut mdns = None;
    if app_config.discovery.enabled {
        match discovery::MdnsBrowser::start(
            &app_config.discovery.service_type,
            app_config.discovery.channel_capacity,
        ) {
            Ok((browser, events)) => {
                let (stop_tx, stop_rx) = oneshot::channel();
                let handle = discovery::spawn_listener(events, resolver.clone(), stop_rx);
                mdns = Some((browser, stop_tx, handle));
            }
            Err(e) => {
                tracing::warn!(error = %e, "mDNS discovery unavailable, sending to broadcast address");
            }
        }
    }

    let socket = broadcaster::bind_socket(&app_config.broadcast.bind_address).await?;
    let (broadcast_stop_tx, broadcast_stop_rx) = oneshot::channel();
    let broadcaster_handle = broadcaster::spawn(
        broadcaster::BroadcasterDeps {
            source: collector.clone(),
            resolver: resolver.clone(),
            sink: socket,
            shutdown_rx: broadcast_stop_rx,
        },
        broadcaster::BroadcasterConfig {
            port: app_config.broadcast.port,
            interval_ms: app_config.broadcast.interval_ms,
            failure_log_interval_secs: app_config.broadcast.failure_log_interval_secs,
        },
    );
    tracing::info!(
        port = app_config.broadcast.port,
        interval_ms = app_config.broadcast.interval_ms,
        target = %resolver.current(),
        "Broadcasting telemetry"
    );

    if app_config.server.enabled {
        let app = routes::app(collector);
        let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        shutdown_signal().await;
    }

    tracing::info!("Received shutdown signal");
    let _ = broadcast_stop_tx.send(());
    let _ = broadcaster_handle.await;
    if let Some((browser, stop_tx, handle)) = mdns {
        let _ = stop_tx.send(());
        let _ = handle.await;
        browser.shutdown();
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
