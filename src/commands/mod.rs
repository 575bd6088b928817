//! Per-data-type command surfaces.
//!
//! Thin callers over the shared [`ClusterClient`](crate::ClusterClient)
//! executor: each method builds an argument list, hashes its primary key for
//! routing, and interprets the reply with one of the typed extractors. An
//! error reply surfaces as [`Error::Server`](crate::Error::Server) with the
//! server's message; a reply of the wrong shape surfaces as
//! [`Error::UnexpectedReply`](crate::Error::UnexpectedReply) carrying the
//! diagnostic command text, after the offending reply has been logged.

mod keys;
mod sets;
mod strings;

pub use keys::KeyCommands;
pub use sets::SetCommands;
pub use strings::StringCommands;

use crate::cluster::ClusterClient;
use crate::core::command::Cmd;
use crate::proto::{Error, Frame, Result};

/// Executes `cmd` and fails early on an error reply, so the extractors only
/// ever see the success shapes.
async fn run(client: &ClusterClient, cmd: &Cmd, key: Option<&[u8]>) -> Result<Frame> {
    let reply = client.execute(cmd, key).await?;
    if let Frame::Error(message) = &reply {
        return Err(Error::Server {
            message: String::from_utf8_lossy(message).into_owned(),
        });
    }
    Ok(reply)
}

/// Failure value for a reply that parsed but had the wrong shape.
fn unexpected(cmd: &Cmd) -> Error {
    Error::UnexpectedReply {
        command: cmd.diagnostic(),
    }
}
