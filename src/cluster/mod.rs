//! Cluster-aware command routing.
//!
//! The pieces, leaves first:
//!
//! - [`slot`]: key bytes to hash slot (CRC16/XMODEM mod 16384, hash tags)
//! - [`topology`]: shard ranges and node records from CLUSTER SLOTS
//! - [`registry`]: lazy per-address connections with health tracking
//! - router: slot to owning master to connection, degrading to the
//!   default connection when the owner is unusable
//! - [`client`]: [`ClusterClient`], the executor the command surfaces share
//!
//! Redirect following (MOVED/ASK) is deliberately not implemented: routing
//! is best-effort against the cached topology and callers resynchronize
//! with [`ClusterClient::refresh_topology`].

/// The cluster client and command executor.
pub mod client;
/// Connection registry.
pub mod registry;
mod router;
/// Slot hashing.
pub mod slot;
/// Topology model and discovery parsing.
pub mod topology;

pub use client::ClusterClient;
pub use registry::ConnectionRegistry;
pub use slot::{key_slot, SLOT_COUNT};
pub use topology::{ClusterTopology, NodeAddr, NodeInfo, NodeRole, SlotRange};
