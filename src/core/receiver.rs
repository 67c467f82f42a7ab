//! # File Receiver
//!
//! Streams a declared number of bytes from the transport into a named sink.
//!
//! The sender has already announced the transfer via a file POST; by the
//! time [`FileReceiver::receive`] runs, the next `declared_size` bytes on
//! the wire are file content. The receiver consumes exactly that many
//! bytes in fixed-size blocks, with the final block sized to the
//! remainder rather than padded.
//!
//! If the sink cannot be opened, the declared byte count is still drained
//! from the transport so that framing for subsequent messages stays
//! intact, and the transfer is reported as [`ReceiveOutcome::Discarded`].

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::error::Result;
use crate::storage::SinkStore;
use crate::transport::Transport;

/// Fixed block size used to stream file content.
pub const BLOCK_SIZE: usize = 2048;

/// How a file transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// All declared bytes were written to the sink.
    Stored,
    /// The sink could not be opened; the declared bytes were read off the
    /// transport and discarded.
    Discarded,
}

/// Streams declared byte counts into sinks opened from a store.
pub struct FileReceiver<'a> {
    store: &'a dyn SinkStore,
    block_size: usize,
}

impl<'a> FileReceiver<'a> {
    pub fn new(store: &'a dyn SinkStore) -> Self {
        Self {
            store,
            block_size: BLOCK_SIZE,
        }
    }

    /// Override the streaming block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Consume exactly `declared_size` bytes from `transport`, appending
    /// them to the sink named `name`.
    pub async fn receive<S>(
        &self,
        name: &str,
        declared_size: u64,
        transport: &mut Transport<S>,
    ) -> Result<ReceiveOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut sink = match self.store.open(name).await {
            Ok(sink) => Some(sink),
            Err(e) => {
                warn!(
                    file = %name,
                    error = %e,
                    bytes = declared_size,
                    "cannot open sink; draining declared bytes"
                );
                None
            }
        };

        let mut block = vec![0u8; self.block_size];
        let mut remaining = declared_size;

        while remaining > 0 {
            let chunk = remaining.min(self.block_size as u64) as usize;
            transport.read_full(&mut block[..chunk]).await?;
            if let Some(sink) = sink.as_mut() {
                sink.write_block(&block[..chunk]).await?;
            }
            remaining -= chunk as u64;
        }

        match sink.as_mut() {
            Some(sink) => {
                sink.finish().await?;
                info!(file = %name, bytes = declared_size, "file received");
                Ok(ReceiveOutcome::Stored)
            }
            None => Ok(ReceiveOutcome::Discarded),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::storage::{MemoryStore, Sink};

    fn transport_over(bytes: Vec<u8>) -> Transport<Cursor<Vec<u8>>> {
        Transport::new(Cursor::new(bytes))
    }

    async fn receive_all(size: u64) -> Vec<u8> {
        let store = MemoryStore::new();
        let mut transport = transport_over(vec![0x5A; size as usize]);
        let outcome = FileReceiver::new(&store)
            .receive("blob", size, &mut transport)
            .await
            .unwrap();
        assert_eq!(outcome, ReceiveOutcome::Stored);
        store.contents("blob").unwrap_or_default()
    }

    #[tokio::test]
    async fn test_byte_count_matches_declared_size_across_boundaries() {
        // Zero, below, exactly one, a multiple, and a multiple plus a
        // remainder of the 2048-byte block size.
        for size in [0u64, 100, 2048, 4096, 5000] {
            let written = receive_all(size).await;
            assert_eq!(written.len() as u64, size, "declared size {size}");
        }
    }

    /// Store that records the size of every block it is handed.
    #[derive(Clone, Default)]
    struct BlockLogStore {
        blocks: Arc<Mutex<Vec<usize>>>,
    }

    struct BlockLogSink {
        blocks: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl SinkStore for BlockLogStore {
        async fn open(&self, _name: &str) -> std::io::Result<Box<dyn Sink>> {
            Ok(Box::new(BlockLogSink {
                blocks: Arc::clone(&self.blocks),
            }))
        }
    }

    #[async_trait]
    impl Sink for BlockLogSink {
        async fn write_block(&mut self, block: &[u8]) -> std::io::Result<()> {
            self.blocks.lock().unwrap().push(block.len());
            Ok(())
        }

        async fn finish(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_5000_bytes_stream_as_2048_2048_904() {
        let store = BlockLogStore::default();
        let mut transport = transport_over(vec![1u8; 5000]);
        FileReceiver::new(&store)
            .receive("blob", 5000, &mut transport)
            .await
            .unwrap();
        assert_eq!(*store.blocks.lock().unwrap(), vec![2048, 2048, 904]);
    }

    #[tokio::test]
    async fn test_unopenable_sink_drains_declared_bytes() {
        let store = MemoryStore::new();
        store.fail_open(true);

        // File bytes followed by a marker that must survive the drain.
        let mut wire = vec![0xFF; 3000];
        wire.extend_from_slice(b"next\n");
        let mut transport = transport_over(wire);

        let outcome = FileReceiver::new(&store)
            .receive("blob", 3000, &mut transport)
            .await
            .unwrap();
        assert_eq!(outcome, ReceiveOutcome::Discarded);
        assert_eq!(store.contents("blob"), None);
        assert_eq!(transport.read_line().await.unwrap(), "next");
    }

    #[tokio::test]
    async fn test_truncated_transfer_is_an_io_error() {
        let store = MemoryStore::new();
        let mut transport = transport_over(vec![0u8; 10]);
        let result = FileReceiver::new(&store)
            .receive("blob", 100, &mut transport)
            .await;
        assert!(result.is_err());
    }
}
