use std::io;

use thiserror::Error;

/// Result type alias for shardis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while routing and executing commands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An IO error occurred on an established connection.
    #[error("IO error: {source}")]
    Io {
        /// The underlying IO error.
        #[from]
        source: io::Error,
    },

    /// A connect attempt to a node failed.
    #[error("connection to {address} failed: {source}")]
    Connection {
        /// The address that was being connected to (host:port).
        address: String,
        /// The underlying IO error.
        source: io::Error,
    },

    /// The reply bytes did not parse as a valid RESP reply.
    ///
    /// Fatal to the single command that read them, not to the client.
    #[error("protocol error: {message}")]
    Protocol {
        /// Description of the error.
        message: String,
    },

    /// Topology discovery failed or returned a malformed shape.
    ///
    /// The refresh is aborted and the previous topology kept.
    #[error("topology discovery failed: {message}")]
    Discovery {
        /// Description of the error.
        message: String,
    },

    /// The server returned an error reply.
    #[error("server error: {message}")]
    Server {
        /// Error message from the server.
        message: String,
    },

    /// The reply parsed fine but was not the shape the caller required.
    ///
    /// The offending reply has already been logged alongside the command.
    #[error("unexpected reply type for command [{command}]")]
    UnexpectedReply {
        /// Diagnostic rendering of the command that was executed.
        command: String,
    },

    /// Invalid argument provided by the caller.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },
}
