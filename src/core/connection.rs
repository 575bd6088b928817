use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::proto::codec::{Decoder, Encoder};
use crate::proto::frame::Frame;
use crate::proto::{Error, Result};

const READ_CHUNK_SIZE: usize = 4096;

/// A framed connection to a single Redis node.
///
/// Wraps an async byte stream and speaks whole RESP frames: one request out,
/// one reply back. Timeouts and cancellation are not handled here; a stalled
/// read blocks until the transport reports an error.
pub struct Connection<S> {
    stream: S,
    decoder: Decoder,
    encoder: Encoder,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps the given stream in a framed connection.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: Decoder::new(),
            encoder: Encoder::new(),
        }
    }

    /// Encodes and sends one frame.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.encoder.encode(frame);
        let data = self.encoder.take();
        self.stream.write_all(&data).await?;
        Ok(())
    }

    /// Reads until one complete frame is available and returns it.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            match self.decoder.decode() {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {
                    let mut buf = [0u8; READ_CHUNK_SIZE];
                    let n = self.stream.read(&mut buf).await?;
                    if n == 0 {
                        return Err(Error::Io {
                            source: std::io::Error::new(
                                std::io::ErrorKind::UnexpectedEof,
                                "connection closed before a complete reply",
                            ),
                        });
                    }
                    self.decoder.append(&buf[..n]);
                }
                Err(message) => return Err(Error::Protocol { message }),
            }
        }
    }
}
