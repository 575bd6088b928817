use bytes::Bytes;
use tracing::{debug, error, warn};

use crate::proto::frame::Frame;

/// A command ready to be sent to Redis.
///
/// Holds the ordered argument list (command name first). The wire request is
/// the RESP multi-bulk rendering of [`to_frame`](Cmd::to_frame); the quoted
/// form from [`diagnostic`](Cmd::diagnostic) exists only for log messages and
/// is generated independently of the wire bytes.
///
/// # Example
///
/// ```
/// use shardis::Cmd;
///
/// let cmd = Cmd::new("SET").arg("name".to_string()).arg("martin".to_string());
/// assert_eq!(cmd.diagnostic(), r#""SET" "name" "martin""#);
/// ```
#[derive(Debug, Clone)]
pub struct Cmd {
    args: Vec<Bytes>,
}

impl Cmd {
    /// Creates a new command with the given name.
    #[inline]
    pub fn new(name: impl Into<Bytes>) -> Self {
        Self {
            args: vec![name.into()],
        }
    }

    /// Appends one argument.
    #[inline]
    pub fn arg<T: Into<Bytes>>(mut self, arg: T) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument from an iterator.
    #[inline]
    pub fn args<T, I>(mut self, args: I) -> Self
    where
        T: Into<Bytes>,
        I: IntoIterator<Item = T>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Renders the command as a RESP array of bulk strings, the request
    /// shape the server executes.
    pub fn to_frame(&self) -> Frame {
        Frame::Array(
            self.args
                .iter()
                .map(|arg| Frame::BulkString(Some(arg.clone())))
                .collect(),
        )
    }

    /// Quoted, human-readable form of the command, for diagnostics only.
    pub fn diagnostic(&self) -> String {
        let mut out = String::new();
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push('"');
            out.push_str(&String::from_utf8_lossy(arg));
            out.push('"');
        }
        out
    }
}

/// Outcome of a status check where a nil reply is a valid, non-error answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOrNil {
    /// The reply was neither a status nor nil, or the status did not match.
    Failed,
    /// The reply was nil.
    Nil,
    /// The reply was a status matching the expectation.
    Matched,
}

/// One page of a cursor-driven enumeration (SCAN-style replies).
///
/// The server signals the end of the enumeration by returning cursor `0`;
/// a negative cursor means the reply did not have the cursor-array shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage {
    /// The cursor to pass to the next call, `0` when finished, `-1` when
    /// the reply was malformed.
    pub cursor: i64,
    /// The entries of this page.
    pub entries: Vec<String>,
}

impl CursorPage {
    /// Returns true if the reply parsed as a valid cursor array.
    pub fn is_valid(&self) -> bool {
        self.cursor >= 0
    }

    /// Returns true once the server has reported the final page.
    pub fn is_finished(&self) -> bool {
        self.cursor == 0
    }
}

/// Checks a status reply, comparing case-insensitively against `expected`
/// when given. An empty status or any other reply shape is a failure.
pub fn as_status(reply: &Frame, expected: Option<&str>, command: &str) -> bool {
    let Frame::SimpleString(status) = reply else {
        error!(command, reply = %reply.describe(), "command failed");
        return false;
    };
    let status = String::from_utf8_lossy(status);
    if status.is_empty() {
        warn!(command, "command failed, status is empty");
        return false;
    }
    match expected {
        None => {
            debug!(command, "command ok");
            true
        }
        Some(expected) if status.eq_ignore_ascii_case(expected) => {
            debug!(command, "command ok");
            true
        }
        Some(expected) => {
            warn!(command, %status, expected, "command failed, status mismatch");
            false
        }
    }
}

/// Like [`as_status`], but a nil reply is a distinct, valid outcome.
pub fn as_status_or_nil(reply: &Frame, expected: Option<&str>, command: &str) -> StatusOrNil {
    if reply.is_nil() {
        debug!(command, "command ok, reply is nil");
        return StatusOrNil::Nil;
    }
    if !matches!(reply, Frame::SimpleString(_)) {
        error!(command, reply = %reply.describe(), "command failed");
        return StatusOrNil::Failed;
    }
    if as_status(reply, expected, command) {
        StatusOrNil::Matched
    } else {
        StatusOrNil::Failed
    }
}

/// Extracts a bulk string reply. Nil and every other shape are failures.
pub fn as_string(reply: &Frame, command: &str) -> Option<String> {
    match reply {
        Frame::BulkString(Some(data)) => {
            debug!(command, "command ok");
            Some(String::from_utf8_lossy(data).into_owned())
        }
        other => {
            error!(command, reply = %other.describe(), "command failed");
            None
        }
    }
}

/// Extracts a bulk string reply where nil means "no value".
///
/// The outer `Option` is the success flag (shape failure when `None`); the
/// inner `Option` distinguishes a present value from a nil reply.
pub fn as_string_or_nil(reply: &Frame, command: &str) -> Option<Option<String>> {
    match reply {
        Frame::BulkString(Some(data)) => {
            debug!(command, "command ok");
            Some(Some(String::from_utf8_lossy(data).into_owned()))
        }
        nil if nil.is_nil() => {
            debug!(command, "command ok, reply is nil");
            Some(None)
        }
        other => {
            error!(command, reply = %other.describe(), "command failed");
            None
        }
    }
}

/// Extracts an integer reply.
pub fn as_integer(reply: &Frame, command: &str) -> Option<i64> {
    match reply {
        Frame::Integer(n) => {
            debug!(command, "command ok");
            Some(*n)
        }
        Frame::Error(_) => {
            error!(command, reply = %reply.describe(), "command failed");
            None
        }
        other => {
            warn!(command, reply = %other.describe(), "unexpected reply");
            None
        }
    }
}

/// Extracts an integer reply, mapping nil to `0` with success.
pub fn as_integer_or_nil(reply: &Frame, command: &str) -> Option<i64> {
    if reply.is_nil() {
        debug!(command, "command ok, reply is nil");
        return Some(0);
    }
    as_integer(reply, command)
}

/// Extracts an array reply leniently: each element that is a bulk string
/// becomes `Some`, any other element shape is reported as `None` in its
/// slot rather than failing the whole array.
pub fn as_string_array(reply: &Frame, command: &str) -> Option<Vec<Option<String>>> {
    let Frame::Array(items) = reply else {
        error!(command, reply = %reply.describe(), "command failed");
        return None;
    };
    debug!(command, "command ok");
    Some(
        items
            .iter()
            .map(|item| match item {
                Frame::BulkString(Some(data)) => Some(String::from_utf8_lossy(data).into_owned()),
                _ => None,
            })
            .collect(),
    )
}

/// Extracts a SCAN-style reply: a two-element array holding the next cursor
/// (an integer-valued bulk string) and the page of results (an array of bulk
/// strings). Any other shape reports an invalid cursor and no entries.
pub fn as_cursor_array(reply: &Frame, command: &str) -> CursorPage {
    let mut page = CursorPage {
        cursor: -1,
        entries: Vec::new(),
    };

    let Frame::Array(items) = reply else {
        error!(command, reply = %reply.describe(), "command failed");
        return page;
    };
    if items.len() != 2 {
        error!(command, elements = items.len(), "command failed, cursor array must have 2 elements");
        return page;
    }

    match &items[0] {
        Frame::BulkString(Some(data)) => {
            match std::str::from_utf8(data).ok().and_then(|s| s.parse::<i64>().ok()) {
                Some(cursor) => page.cursor = cursor,
                None => {
                    warn!(command, "cursor is not an integer");
                    return page;
                }
            }
        }
        other => {
            warn!(command, reply = %other.describe(), "unexpected cursor element");
            return page;
        }
    }

    let Frame::Array(entries) = &items[1] else {
        warn!(command, reply = %items[1].describe(), "unexpected result page element");
        page.cursor = -1;
        return page;
    };
    debug!(command, "command ok");
    for entry in entries {
        match entry {
            Frame::BulkString(Some(data)) => {
                page.entries.push(String::from_utf8_lossy(data).into_owned());
            }
            _ => page.entries.push(String::new()),
        }
    }
    page
}
