//! The cluster-aware client: owns the registry and the cached topology,
//! refreshes the topology on demand, and executes routed commands.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::registry::ConnectionRegistry;
use super::router::Router;
use super::topology::{ClusterTopology, NodeAddr};
use crate::commands::{KeyCommands, SetCommands, StringCommands};
use crate::core::command::Cmd;
use crate::proto::frame::Frame;
use crate::proto::{Error, Result};

/// Cluster-aware Redis client.
///
/// Commands carrying a key are routed to the master owning the key's slot;
/// keyless commands use the seed connection. Topology and connections are
/// per-instance state — independent clients share nothing.
///
/// # Example
///
/// ```no_run
/// use shardis::ClusterClient;
///
/// #[tokio::main]
/// async fn main() -> shardis::Result<()> {
///     let client = ClusterClient::connect("127.0.0.1:7000").await?;
///     client.strings().set("name", "martin").await?;
///     Ok(())
/// }
/// ```
pub struct ClusterClient {
    topology: Arc<RwLock<ClusterTopology>>,
    registry: Arc<ConnectionRegistry>,
    router: Router,
}

impl ClusterClient {
    /// Connects to the seed node and discovers the cluster topology.
    ///
    /// The address is `host:port`, optionally prefixed with `redis://`.
    /// The seed connection is established eagerly; if topology discovery
    /// fails (for example against a standalone server) the client stays
    /// usable with an empty topology and every command runs on the seed
    /// connection.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unparsable address and
    /// [`Error::Connection`] when the seed node cannot be reached.
    pub async fn connect(addr: &str) -> Result<Self> {
        let seed = Self::parse_addr(addr)?;
        let topology = Arc::new(RwLock::new(ClusterTopology::new()));
        let registry = Arc::new(ConnectionRegistry::new(seed));
        let router = Router::new(Arc::clone(&topology), Arc::clone(&registry));
        let client = Self {
            topology,
            registry,
            router,
        };

        client.registry.default_connection().await?;
        if let Err(err) = client.refresh_topology().await {
            warn!(
                error = %err,
                "topology discovery failed, continuing with the default connection only"
            );
        }
        Ok(client)
    }

    /// Parses `host:port` (with or without a `redis://` scheme) into a
    /// node address. The port defaults to 6379.
    fn parse_addr(addr: &str) -> Result<NodeAddr> {
        let addr = addr.trim();
        let with_scheme;
        let addr = if addr.contains("://") {
            addr
        } else {
            with_scheme = format!("redis://{}", addr);
            &with_scheme
        };

        let parsed = url::Url::parse(addr).map_err(|_| Error::InvalidArgument {
            message: "invalid address format".to_string(),
        })?;
        if parsed.scheme() != "redis" {
            return Err(Error::InvalidArgument {
                message: "invalid scheme, expected redis://".to_string(),
            });
        }
        let host = parsed.host_str().ok_or_else(|| Error::InvalidArgument {
            message: "missing host in address".to_string(),
        })?;
        Ok(NodeAddr::new(host, parsed.port().unwrap_or(6379)))
    }

    /// Re-runs topology discovery (CLUSTER SLOTS) over the default
    /// connection and swaps in the parsed topology atomically.
    ///
    /// All-or-nothing: on any failure the previous topology stays in
    /// place untouched and [`Error::Discovery`] is returned.
    pub async fn refresh_topology(&self) -> Result<()> {
        let cmd = Cmd::new("CLUSTER").arg("SLOTS");
        let reply = self
            .execute(&cmd, None)
            .await
            .map_err(|err| Error::Discovery {
                message: err.to_string(),
            })?;
        if let Frame::Error(message) = &reply {
            return Err(Error::Discovery {
                message: String::from_utf8_lossy(message).into_owned(),
            });
        }

        let next = ClusterTopology::from_cluster_slots(reply)?;
        let mut topology = self.topology.write().await;
        *topology = next;
        info!(
            ranges = topology.slot_ranges().len(),
            nodes = topology.node_count(),
            "cluster topology refreshed"
        );
        Ok(())
    }

    /// Routes, sends, and reads exactly one reply for `cmd`.
    ///
    /// `key` is the routing key, absent for non-sharded commands. An I/O or
    /// protocol failure marks the connection errored and invalidates it so
    /// the next request reconnects (once framing sync is lost the stream
    /// cannot be trusted); the command itself is aborted, never retried.
    pub async fn execute(&self, cmd: &Cmd, key: Option<&[u8]>) -> Result<Frame> {
        let handle = self.router.route(key).await?;
        let request = cmd.to_frame();

        let mut conn = handle.conn().lock().await;
        let sent = conn.write_frame(&request).await;
        let outcome = match sent {
            Ok(()) => conn.read_frame().await,
            Err(err) => Err(err),
        };
        drop(conn);

        match outcome {
            Ok(reply) => Ok(reply),
            Err(err) => {
                if matches!(err, Error::Io { .. } | Error::Protocol { .. }) {
                    handle.mark_errored();
                    self.registry.invalidate(handle.addr()).await;
                }
                Err(err)
            }
        }
    }

    /// Address of the master currently owning `slot`, or `None` when the
    /// slot is unassigned.
    pub async fn node_for_slot(&self, slot: u16) -> Option<NodeAddr> {
        let topology = self.topology.read().await;
        topology.master_for_slot(slot).map(|node| node.addr.clone())
    }

    /// Number of known cluster nodes (replicas included).
    pub async fn node_count(&self) -> usize {
        self.topology.read().await.node_count()
    }

    /// Number of cached shard ranges.
    pub async fn slot_range_count(&self) -> usize {
        self.topology.read().await.slot_ranges().len()
    }

    /// String command surface (GET/SET/INCR/...).
    pub fn strings(&self) -> StringCommands<'_> {
        StringCommands::new(self)
    }

    /// Set command surface (SADD/SMEMBERS/...).
    pub fn sets(&self) -> SetCommands<'_> {
        SetCommands::new(self)
    }

    /// Key-space command surface (DEL/EXISTS/EXPIRE/SCAN/...).
    pub fn keys(&self) -> KeyCommands<'_> {
        KeyCommands::new(self)
    }
}

impl std::fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterClient")
            .field("default_addr", self.registry.default_addr())
            .finish()
    }
}
