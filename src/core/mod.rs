//! Command construction, typed reply extraction, and framed connections.

/// Command builders and typed reply extractors.
pub mod command;
/// Framed single-node connection.
pub mod connection;

pub use command::{Cmd, CursorPage, StatusOrNil};
pub use connection::Connection;
