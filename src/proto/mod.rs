//! RESP wire protocol: reply model, streaming codec, and the error taxonomy.

/// RESP frame encoding and decoding.
pub mod codec;
/// Error types for protocol, connection, and discovery failures.
pub mod error;
/// The reply model: a recursive, tagged frame value.
pub mod frame;

pub use error::{Error, Result};
pub use frame::Frame;
