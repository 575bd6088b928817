//! Slot-based command routing with degraded fallback.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::registry::{ConnectionRegistry, NodeHandle};
use super::slot::key_slot;
use super::topology::{ClusterTopology, NodeAddr};
use crate::proto::Result;

/// Where a command should be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RouteTarget {
    /// The default (seed) connection: non-keyed command, unassigned slot,
    /// or degraded routing.
    Default,
    /// The master owning the key's slot.
    Node(NodeAddr),
}

/// Picks a connection for each command.
///
/// Routing is best-effort against the cached topology: when the owning
/// node is unknown or unusable the command degrades to the default
/// connection instead of failing, and the owner may still reject or
/// redirect the key. Routing never triggers a topology refresh.
pub(crate) struct Router {
    topology: Arc<RwLock<ClusterTopology>>,
    registry: Arc<ConnectionRegistry>,
}

impl Router {
    pub(crate) fn new(
        topology: Arc<RwLock<ClusterTopology>>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self { topology, registry }
    }

    /// Decides the target node for a command without touching the network.
    pub(crate) async fn resolve(&self, key: Option<&[u8]>) -> RouteTarget {
        let Some(key) = key else {
            return RouteTarget::Default;
        };
        let slot = key_slot(key);
        let topology = self.topology.read().await;
        match topology.master_for_slot(slot) {
            Some(node) => RouteTarget::Node(node.addr.clone()),
            None => {
                debug!(slot, "slot unassigned, using default connection");
                RouteTarget::Default
            }
        }
    }

    /// Resolves the target and returns its connection, establishing one if
    /// needed. A target whose connect fails degrades to the default
    /// connection with a warning; only a failure to reach the default
    /// itself is an error.
    pub(crate) async fn route(&self, key: Option<&[u8]>) -> Result<Arc<NodeHandle>> {
        match self.resolve(key).await {
            RouteTarget::Default => self.registry.default_connection().await,
            RouteTarget::Node(addr) => match self.registry.connection_for(&addr).await {
                Ok(handle) => Ok(handle),
                Err(err) => {
                    warn!(
                        addr = %addr,
                        error = %err,
                        "slot owner unusable, degrading to default connection"
                    );
                    self.registry.default_connection().await
                }
            },
        }
    }
}
