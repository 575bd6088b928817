//! Connection registry: one lazily-established connection per node address.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::topology::NodeAddr;
use crate::core::connection::Connection;
use crate::proto::{Error, Result};

/// A live connection to one node, plus its health state.
///
/// The connection sits behind a mutex that callers hold for a full
/// request/reply cycle — one command in flight per node, no pipelining.
/// The health flag moves `Connected -> Errored` when an I/O failure is
/// observed; an errored handle is replaced on the next lookup.
pub struct NodeHandle {
    addr: NodeAddr,
    healthy: AtomicBool,
    conn: Mutex<Connection<TcpStream>>,
}

impl NodeHandle {
    fn new(addr: NodeAddr, conn: Connection<TcpStream>) -> Self {
        Self {
            addr,
            healthy: AtomicBool::new(true),
            conn: Mutex::new(conn),
        }
    }

    /// The address this handle is connected to.
    pub fn addr(&self) -> &NodeAddr {
        &self.addr
    }

    /// Returns false once an I/O failure has been observed on this handle.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Marks the handle errored so the registry replaces it on next use.
    pub(crate) fn mark_errored(&self) {
        self.healthy.store(false, Ordering::Release);
    }

    /// The framed connection; lock it for the whole request/reply cycle.
    pub(crate) fn conn(&self) -> &Mutex<Connection<TcpStream>> {
        &self.conn
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("addr", &self.addr)
            .field("healthy", &self.is_healthy())
            .finish()
    }
}

/// Owns the live node connections, keyed by `(host, port)`.
///
/// Connects lazily on first use per address and reuses healthy handles. No
/// retry policy lives here; on a failed connect the caller decides whether
/// to fall back.
pub struct ConnectionRegistry {
    default_addr: NodeAddr,
    connections: RwLock<HashMap<NodeAddr, Arc<NodeHandle>>>,
}

impl ConnectionRegistry {
    /// Creates a registry whose default connection targets `default_addr`,
    /// the address the client was constructed with.
    pub fn new(default_addr: NodeAddr) -> Self {
        Self {
            default_addr,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// The address used for non-keyed and topology-discovery commands.
    pub fn default_addr(&self) -> &NodeAddr {
        &self.default_addr
    }

    /// Returns the connection used for non-keyed and discovery commands.
    pub async fn default_connection(&self) -> Result<Arc<NodeHandle>> {
        self.connection_for(&self.default_addr).await
    }

    /// Returns an existing healthy connection to `addr`, or establishes a
    /// new one (replacing an errored handle if present).
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] carrying the attempted address when the
    /// connect fails.
    pub async fn connection_for(&self, addr: &NodeAddr) -> Result<Arc<NodeHandle>> {
        if let Some(handle) = self.connections.read().await.get(addr) {
            if handle.is_healthy() {
                return Ok(Arc::clone(handle));
            }
        }

        debug!(addr = %addr, "connecting to node");
        let stream = TcpStream::connect((addr.host.as_str(), addr.port))
            .await
            .map_err(|source| Error::Connection {
                address: addr.to_string(),
                source,
            })?;
        let handle = Arc::new(NodeHandle::new(addr.clone(), Connection::new(stream)));
        let mut connections = self.connections.write().await;
        // Another task may have connected while we did; keep the handle
        // that won the race so each address has one live connection.
        if let Some(existing) = connections.get(addr) {
            if existing.is_healthy() {
                return Ok(Arc::clone(existing));
            }
        }
        connections.insert(addr.clone(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Drops the connection for `addr`, if any, so the next request
    /// re-establishes it.
    pub async fn invalidate(&self, addr: &NodeAddr) {
        if self.connections.write().await.remove(addr).is_some() {
            debug!(addr = %addr, "invalidated connection");
        }
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("default_addr", &self.default_addr)
            .finish()
    }
}
