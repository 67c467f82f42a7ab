//! # Transport
//!
//! Byte-oriented connection abstraction for the framing core.
//!
//! [`Transport`] wraps any reliable, ordered byte stream
//! (`AsyncRead + AsyncWrite`) behind the three capabilities the framer and
//! file receiver need: line-delimited reads, fixed-size reads, and writes.
//! Keeping the surface this small lets every protocol component be tested
//! against `tokio::io::duplex` or an in-memory cursor instead of a live
//! socket.
//!
//! ## Limits
//! Attribute lines are capped at [`MAX_LINE_LEN`] bytes before the
//! terminator is seen, so a peer cannot grow an unbounded buffer by never
//! sending a newline.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{ProtocolError, Result};

/// Terminator byte for attribute lines.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Maximum accepted attribute-line length in bytes.
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Buffered transport over one peer connection.
///
/// Owns the underlying stream for the lifetime of the connection; all
/// reads and writes are sequential and blocking on the calling task.
pub struct Transport<S> {
    stream: BufReader<S>,
    max_line_len: usize,
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            max_line_len: MAX_LINE_LEN,
        }
    }

    /// Override the attribute-line length cap.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Read one line, stripping the terminator.
    ///
    /// Returns an empty string when the peer has closed the connection
    /// before sending any bytes, mirroring the wire rule that zero
    /// attributes read signals termination.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let (done, used) = {
                let available = self.stream.fill_buf().await?;
                if available.is_empty() {
                    // Peer closed; whatever was gathered is the final line.
                    (true, 0)
                } else {
                    match available.iter().position(|&b| b == LINE_TERMINATOR) {
                        Some(i) => {
                            line.extend_from_slice(&available[..i]);
                            (true, i + 1)
                        }
                        None => {
                            line.extend_from_slice(available);
                            (false, available.len())
                        }
                    }
                }
            };
            self.stream.consume(used);

            if line.len() > self.max_line_len {
                return Err(ProtocolError::OversizedLine {
                    limit: self.max_line_len,
                });
            }
            if done {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Read exactly `len` bytes into an owned buffer.
    pub async fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf).await?;
        Ok(buf)
    }

    /// Fill the whole of `buf` from the stream.
    pub async fn read_full(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf).await?;
        Ok(())
    }

    /// Write raw bytes to the peer.
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.get_mut().write_all(bytes).await?;
        Ok(())
    }

    /// Flush buffered writes through to the peer.
    pub async fn flush(&mut self) -> Result<()> {
        self.stream.get_mut().flush().await?;
        Ok(())
    }
}
