use bytes::Bytes;

/// A RESP (Redis Serialization Protocol) frame.
///
/// One server reply is one frame; only [`Frame::Array`] may have children,
/// so a nested reply forms a tree of value-owned frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Status reply (`+OK`).
    SimpleString(Vec<u8>),
    /// Error reply (`-ERR ...`).
    Error(Vec<u8>),
    /// Integer reply (`:1000`).
    Integer(i64),
    /// Bulk string reply (`$6\r\nfoobar`); `None` is the nil bulk (`$-1`).
    BulkString(Option<Bytes>),
    /// Array reply (`*2\r\n...`).
    Array(Vec<Frame>),
    /// Nil array reply (`*-1`).
    Null,
}

impl Frame {
    /// Returns true for either nil form (`$-1` or `*-1`).
    pub fn is_nil(&self) -> bool {
        matches!(self, Frame::Null | Frame::BulkString(None))
    }

    /// Element count under the reply-size convention: nil is 0, scalar
    /// kinds are 1, arrays report their child count.
    pub fn size(&self) -> usize {
        match self {
            Frame::Null | Frame::BulkString(None) => 0,
            Frame::Array(items) => items.len(),
            _ => 1,
        }
    }

    /// Human-readable rendering of the reply's variant and value, used in
    /// diagnostic log messages when a reply has an unexpected shape.
    pub fn describe(&self) -> String {
        match self {
            Frame::SimpleString(s) => {
                format!("Reply Type: Status, Status: {}", String::from_utf8_lossy(s))
            }
            Frame::Error(e) => {
                format!("Reply Type: Error, Errstr: {}", String::from_utf8_lossy(e))
            }
            Frame::Integer(n) => format!("Reply Type: Integer, Integer: {}", n),
            Frame::BulkString(Some(s)) => {
                format!("Reply Type: String, String: {}", String::from_utf8_lossy(s))
            }
            Frame::BulkString(None) | Frame::Null => "Reply Type: Nil".to_string(),
            Frame::Array(items) => format!("Reply Type: Array, Elements: {}", items.len()),
        }
    }
}
