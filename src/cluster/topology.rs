//! Cluster topology: shard ranges, node records, and the CLUSTER SLOTS parser.

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use super::slot::SLOT_COUNT;
use crate::proto::frame::Frame;
use crate::proto::{Error, Result};

/// Network address of one cluster member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddr {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl NodeAddr {
    /// Creates an address from host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Role a node plays for the ranges it appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Serves reads and writes for its slot ranges.
    Master,
    /// Replicates a master; never routed to by this client.
    Replica,
}

/// One known cluster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// The node's address.
    pub addr: NodeAddr,
    /// Master or replica.
    pub role: NodeRole,
}

/// An inclusive slot interval `[begin, end]` owned by one master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRange {
    /// First slot of the range.
    pub begin: u16,
    /// Last slot of the range (inclusive).
    pub end: u16,
    /// Address of the owning master; always present in the topology's
    /// node set.
    pub master: NodeAddr,
}

impl SlotRange {
    /// Returns true if `slot` falls inside this range.
    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.begin && slot <= self.end
    }
}

/// The cached mapping from slot ranges to cluster nodes.
///
/// Rebuilt wholesale by each topology refresh and swapped in atomically;
/// ranges are never mutated one by one. Ranges are pairwise disjoint but
/// need not cover the whole slot space — an unassigned slot is a valid,
/// if degraded, state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterTopology {
    slot_ranges: Vec<SlotRange>,
    nodes: HashMap<NodeAddr, NodeInfo>,
}

impl ClusterTopology {
    /// Creates an empty topology (no ranges, no nodes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the master owning `slot`, or `None` when the slot is
    /// currently unassigned.
    pub fn master_for_slot(&self, slot: u16) -> Option<&NodeInfo> {
        self.slot_ranges
            .iter()
            .find(|range| range.contains(slot))
            .and_then(|range| self.nodes.get(&range.master))
    }

    /// The shard ranges, in reply order.
    pub fn slot_ranges(&self) -> &[SlotRange] {
        &self.slot_ranges
    }

    /// Number of known nodes, replicas included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no ranges are known (pre-discovery or standalone).
    pub fn is_empty(&self) -> bool {
        self.slot_ranges.is_empty()
    }

    /// Parses a CLUSTER SLOTS reply into a topology.
    ///
    /// Each entry must be an array of at least `[begin, end, master-info]`;
    /// malformed entries are skipped with a warning rather than failing the
    /// whole parse. Replica info arrays (elements 3+) are recorded in the
    /// node set but never own a range. A non-array outer reply is a
    /// discovery error.
    pub fn from_cluster_slots(reply: Frame) -> Result<Self> {
        let Frame::Array(entries) = reply else {
            return Err(Error::Discovery {
                message: format!("CLUSTER SLOTS reply is not an array ({})", reply.describe()),
            });
        };

        let mut topology = Self::new();
        for entry in entries {
            let Frame::Array(fields) = entry else {
                warn!("skipping slot entry: not an array");
                continue;
            };
            if fields.len() < 3 {
                warn!(elements = fields.len(), "skipping slot entry: too short");
                continue;
            }

            let (Some(begin), Some(end)) = (slot_number(&fields[0]), slot_number(&fields[1]))
            else {
                warn!("skipping slot entry: invalid slot bounds");
                continue;
            };
            let Some(master) = node_addr(&fields[2]) else {
                warn!(begin, end, "skipping slot entry: malformed master info");
                continue;
            };

            topology.slot_ranges.push(SlotRange {
                begin,
                end,
                master: master.clone(),
            });
            topology.nodes.insert(
                master.clone(),
                NodeInfo {
                    addr: master,
                    role: NodeRole::Master,
                },
            );
            for replica_field in &fields[3..] {
                if let Some(addr) = node_addr(replica_field) {
                    topology.nodes.entry(addr.clone()).or_insert(NodeInfo {
                        addr,
                        role: NodeRole::Replica,
                    });
                }
            }
        }
        Ok(topology)
    }
}

/// Extracts a slot bound, rejecting values outside the hash space.
fn slot_number(field: &Frame) -> Option<u16> {
    match field {
        Frame::Integer(n) if (0..i64::from(SLOT_COUNT)).contains(n) => Some(*n as u16),
        _ => None,
    }
}

/// Extracts `[host, port, ...]` from a node info array. The trailing node id
/// and any further elements are ignored.
fn node_addr(field: &Frame) -> Option<NodeAddr> {
    let Frame::Array(fields) = field else {
        return None;
    };
    if fields.len() < 2 {
        return None;
    }
    let host = match &fields[0] {
        Frame::BulkString(Some(data)) => String::from_utf8_lossy(data).into_owned(),
        _ => return None,
    };
    let port = match &fields[1] {
        Frame::Integer(n) if (0..=i64::from(u16::MAX)).contains(n) => *n as u16,
        _ => return None,
    };
    Some(NodeAddr::new(host, port))
}
