// Single-slot destination state shared by the discovery listener (writer) and broadcaster (reader).

use crate::discovery::DiscoveryEvent;
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// No receiver known; send to the subnet broadcast address.
    Broadcast,
    /// Send to the first address advertised by `service`.
    Directed { service: String, address: IpAddr },
}

pub struct TargetResolver {
    broadcast: IpAddr,
    state: RwLock<Target>,
}

impl TargetResolver {
    pub fn new(broadcast: IpAddr) -> Self {
        Self {
            broadcast,
            state: RwLock::new(Target::Broadcast),
        }
    }

    pub fn broadcast_address(&self) -> IpAddr {
        self.broadcast
    }

    /// Address the next datagram should go to.
    pub fn current(&self) -> IpAddr {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            Target::Broadcast => self.broadcast,
            Target::Directed { address, .. } => *address,
        }
    }

    pub fn target(&self) -> Target {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drops any directed target, e.g. when the discovery transport goes away.
    pub fn reset(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Target::Broadcast;
    }

    /// Applies one discovery event. Added/Updated without addresses are ignored; Removed always
    /// falls back to broadcast, whichever service it names.
    pub fn apply(&self, event: DiscoveryEvent) {
        let next = match event {
            DiscoveryEvent::Added { service, addresses }
            | DiscoveryEvent::Updated { service, addresses } => {
                let Some(&address) = addresses.first() else {
                    tracing::debug!(service = %service, "discovery event without addresses ignored");
                    return;
                };
                tracing::info!(service = %service, %address, "Found/updated receiver");
                Target::Directed { service, address }
            }
            DiscoveryEvent::Removed { service } => {
                tracing::info!(service = %service, "Receiver removed, falling back to broadcast");
                Target::Broadcast
            }
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}
