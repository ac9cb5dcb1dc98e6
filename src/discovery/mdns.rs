// mDNS browsing via mdns-sd, forwarded into a tokio channel of DiscoveryEvents.

use mdns_sd::{ServiceDaemon, ServiceEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{DiscoveryEvent, EventTranslator};

pub struct MdnsBrowser {
    daemon: ServiceDaemon,
    service_type: String,
    forwarder: JoinHandle<()>,
}

impl MdnsBrowser {
    /// Starts browsing `service_type` and returns the event stream. Fails when the mDNS daemon
    /// cannot start (no multicast-capable interface, socket errors).
    pub fn start(
        service_type: &str,
        capacity: usize,
    ) -> anyhow::Result<(Self, mpsc::Receiver<DiscoveryEvent>)> {
        let daemon = ServiceDaemon::new().map_err(|e| anyhow::anyhow!("mdns daemon: {}", e))?;
        let browse_rx = daemon
            .browse(service_type)
            .map_err(|e| anyhow::anyhow!("mdns browse {}: {}", service_type, e))?;
        let (tx, rx) = mpsc::channel(capacity);

        let forwarder = tokio::spawn(async move {
            let mut translator = EventTranslator::default();
            while let Ok(event) = browse_rx.recv_async().await {
                let translated = match event {
                    ServiceEvent::ServiceResolved(info) => translator
                        .resolved(info.get_fullname(), info.get_addresses().iter().copied()),
                    ServiceEvent::ServiceRemoved(_, fullname) => {
                        Some(translator.removed(&fullname))
                    }
                    _ => None,
                };
                if let Some(event) = translated
                    && tx.send(event).await.is_err()
                {
                    break;
                }
            }
            tracing::debug!("mDNS browse channel closed");
        });

        tracing::info!(service_type, "mDNS browsing started");
        Ok((
            Self {
                daemon,
                service_type: service_type.to_string(),
                forwarder,
            },
            rx,
        ))
    }

    /// Stops browsing and shuts the daemon down. Errors are logged; nothing is retried.
    pub fn shutdown(self) {
        if let Err(e) = self.daemon.stop_browse(&self.service_type) {
            tracing::debug!(error = %e, "mdns stop_browse failed");
        }
        if let Err(e) = self.daemon.shutdown() {
            tracing::debug!(error = %e, "mdns shutdown failed");
        }
        self.forwarder.abort();
    }
}
