use bytes::{BufMut, BytesMut};

use crate::proto::frame::Frame;

/// RESP encoder that renders [`Frame`] values to wire bytes.
///
/// Frames accumulate in an internal buffer; [`take`](Encoder::take) drains it
/// so the encoder can be reused for the next request.
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Creates an encoder with an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Encodes one frame into the internal buffer.
    pub fn encode(&mut self, frame: &Frame) {
        encode_into(frame, &mut self.buf);
    }

    /// Drains and returns the accumulated bytes, leaving the buffer empty.
    pub fn take(&mut self) -> BytesMut {
        self.buf.split()
    }
}

fn encode_into(frame: &Frame, buf: &mut BytesMut) {
    match frame {
        Frame::SimpleString(s) => {
            buf.put_u8(b'+');
            buf.extend_from_slice(s);
            buf.extend_from_slice(b"\r\n");
        }
        Frame::Error(e) => {
            buf.put_u8(b'-');
            buf.extend_from_slice(e);
            buf.extend_from_slice(b"\r\n");
        }
        Frame::Integer(n) => {
            buf.put_u8(b':');
            buf.extend_from_slice(n.to_string().as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        Frame::BulkString(Some(data)) => {
            buf.put_u8(b'$');
            buf.extend_from_slice(data.len().to_string().as_bytes());
            buf.extend_from_slice(b"\r\n");
            buf.extend_from_slice(data);
            buf.extend_from_slice(b"\r\n");
        }
        Frame::BulkString(None) => {
            buf.extend_from_slice(b"$-1\r\n");
        }
        Frame::Array(items) => {
            buf.put_u8(b'*');
            buf.extend_from_slice(items.len().to_string().as_bytes());
            buf.extend_from_slice(b"\r\n");
            for item in items {
                encode_into(item, buf);
            }
        }
        Frame::Null => {
            buf.extend_from_slice(b"*-1\r\n");
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
