use bytes::{Buf, Bytes, BytesMut};

use crate::proto::frame::Frame;

const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Streaming RESP decoder.
///
/// Feed raw network bytes with [`append`](Decoder::append) and pull complete
/// frames with [`decode`](Decoder::decode). `Ok(None)` means more bytes are
/// needed; the buffer is only consumed once a whole frame (including every
/// child of a nested array) is available, so partial input is never lost.
#[derive(Debug)]
pub struct Decoder {
    buf: BytesMut,
    max_frame_size: usize,
}

impl Decoder {
    /// Creates a decoder with the default 512 MB frame-size limit.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Creates a decoder with a custom maximum frame size in bytes.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_frame_size,
        }
    }

    /// Appends raw bytes received from the network.
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Attempts to decode one complete frame from the buffered bytes.
    ///
    /// Returns `Ok(Some(frame))` on success, `Ok(None)` if the buffer holds
    /// only a prefix of a frame, and `Err` if the bytes are malformed.
    pub fn decode(&mut self) -> Result<Option<Frame>, String> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        if self.buf.len() > self.max_frame_size {
            return Err("buffered data exceeds maximum frame size".to_string());
        }

        let mut pos = 0;
        match self.parse_frame(&mut pos)? {
            Some(frame) => {
                self.buf.advance(pos);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    fn parse_frame(&self, pos: &mut usize) -> Result<Option<Frame>, String> {
        let Some(&marker) = self.buf.get(*pos) else {
            return Ok(None);
        };

        match marker {
            b'+' => Ok(self
                .parse_line(pos)?
                .map(|line| Frame::SimpleString(line.to_vec()))),
            b'-' => Ok(self.parse_line(pos)?.map(|line| Frame::Error(line.to_vec()))),
            b':' => match self.parse_line(pos)? {
                Some(line) => Ok(Some(Frame::Integer(parse_int(line)?))),
                None => Ok(None),
            },
            b'$' => self.parse_bulk_string(pos),
            b'*' => self.parse_array(pos),
            other => Err(format!("unknown frame type: {}", other as char)),
        }
    }

    fn parse_bulk_string(&self, pos: &mut usize) -> Result<Option<Frame>, String> {
        let Some(line) = self.parse_line(pos)? else {
            return Ok(None);
        };
        let len = parse_int(line)?;

        if len == -1 {
            return Ok(Some(Frame::BulkString(None)));
        }
        if len < 0 {
            return Err(format!("invalid bulk string length: {}", len));
        }
        let len = len as usize;
        if len > self.max_frame_size {
            return Err("bulk string length exceeds maximum frame size".to_string());
        }
        if self.buf.len() < *pos + len + 2 {
            return Ok(None);
        }
        if &self.buf[*pos + len..*pos + len + 2] != b"\r\n" {
            return Err("expected CRLF after bulk string payload".to_string());
        }

        let data = Bytes::copy_from_slice(&self.buf[*pos..*pos + len]);
        *pos += len + 2;
        Ok(Some(Frame::BulkString(Some(data))))
    }

    fn parse_array(&self, pos: &mut usize) -> Result<Option<Frame>, String> {
        let Some(line) = self.parse_line(pos)? else {
            return Ok(None);
        };
        let count = parse_int(line)?;

        if count == -1 {
            return Ok(Some(Frame::Null));
        }
        if count < 0 {
            return Err(format!("invalid array length: {}", count));
        }
        let count = count as usize;
        // Assume at least 4 wire bytes per element when sanity-checking.
        if count > self.max_frame_size / 4 {
            return Err("array length exceeds maximum frame size".to_string());
        }

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            match self.parse_frame(pos)? {
                Some(frame) => items.push(frame),
                None => return Ok(None),
            }
        }
        Ok(Some(Frame::Array(items)))
    }

    /// Reads one CRLF-terminated line starting after the type marker at
    /// `pos`, advancing `pos` past the terminator. The marker byte itself
    /// is skipped.
    fn parse_line(&self, pos: &mut usize) -> Result<Option<&[u8]>, String> {
        let start = *pos + 1;
        let mut i = start;
        while i + 1 < self.buf.len() {
            if self.buf[i] == b'\r' {
                if self.buf[i + 1] != b'\n' {
                    return Err("expected LF after CR".to_string());
                }
                *pos = i + 2;
                return Ok(Some(&self.buf[start..i]));
            }
            i += 1;
        }
        Ok(None)
    }
}

fn parse_int(line: &[u8]) -> Result<i64, String> {
    std::str::from_utf8(line)
        .map_err(|e| e.to_string())?
        .parse::<i64>()
        .map_err(|e| e.to_string())
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
