// Service discovery: transport-neutral events and the task that feeds them to the resolver.

mod mdns;

pub use mdns::MdnsBrowser;

use crate::target::TargetResolver;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    Added {
        service: String,
        addresses: Vec<IpAddr>,
    },
    Updated {
        service: String,
        addresses: Vec<IpAddr>,
    },
    Removed {
        service: String,
    },
}

/// Turns raw browse notifications into [`DiscoveryEvent`]s. The first resolution of a name is
/// `Added`, later ones are `Updated`; resolutions without addresses produce nothing.
#[derive(Debug, Default)]
pub struct EventTranslator {
    known: HashSet<String>,
}

impl EventTranslator {
    pub fn resolved(
        &mut self,
        service: &str,
        addresses: impl IntoIterator<Item = IpAddr>,
    ) -> Option<DiscoveryEvent> {
        let addresses = order_addresses(addresses);
        if addresses.is_empty() {
            tracing::debug!(service, "service resolved without addresses, dropped");
            return None;
        }
        let service = service.to_string();
        if self.known.insert(service.clone()) {
            Some(DiscoveryEvent::Added { service, addresses })
        } else {
            Some(DiscoveryEvent::Updated { service, addresses })
        }
    }

    pub fn removed(&mut self, service: &str) -> DiscoveryEvent {
        self.known.remove(service);
        DiscoveryEvent::Removed {
            service: service.to_string(),
        }
    }
}

/// IPv4 before IPv6, each ascending, duplicates removed. Transports hand addresses over as
/// unordered sets; this makes "first address" deterministic.
pub fn order_addresses(addresses: impl IntoIterator<Item = IpAddr>) -> Vec<IpAddr> {
    let mut ordered: Vec<IpAddr> = addresses.into_iter().collect();
    ordered.sort_by_key(|a| (a.is_ipv6(), *a));
    ordered.dedup();
    ordered
}

/// Spawns the task that applies discovery events to `resolver` in arrival order.
/// When the event source closes the resolver falls back to broadcast and the task exits.
pub fn spawn_listener(
    mut events: mpsc::Receiver<DiscoveryEvent>,
    resolver: Arc<TargetResolver>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::debug!("Discovery listener shutting down");
                    break;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => resolver.apply(event),
                        None => {
                            tracing::warn!("Discovery event source closed, falling back to broadcast");
                            resolver.reset();
                            break;
                        }
                    }
                }
            }
        }
    })
}
