//! # Shardis
//!
//! Cluster-aware Redis client: keys are hashed to slots locally and each
//! command is sent straight to the master that owns its slot, with a
//! fallback to the seed connection whenever routing cannot be completed.
//!
//! The slot map comes from `CLUSTER SLOTS` and is refreshed atomically; a
//! failed refresh keeps the previous map. Redirections (`MOVED`/`ASK`) are
//! not followed, so the map should be refreshed after resharding.
//!
//! ## Example
//!
//! ```no_run
//! use shardis::ClusterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClusterClient::connect("redis://localhost:6379").await?;
//!     client.strings().set("name", "martin").await?;
//!     let value = client.strings().get("name").await?;
//!     assert_eq!(value.as_deref(), Some("martin"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod cluster;
pub mod commands;
pub mod core;
pub mod proto;

pub use crate::cluster::{
    key_slot, ClusterClient, NodeAddr, NodeInfo, NodeRole, SlotRange, SLOT_COUNT,
};
pub use crate::commands::{KeyCommands, SetCommands, StringCommands};
pub use crate::core::{Cmd, Connection, CursorPage, StatusOrNil};
pub use crate::proto::{Error, Frame, Result};
