//! # Storage
//!
//! Named binary sinks for received file content.
//!
//! The file receiver streams declared byte counts into a [`Sink`] opened
//! from a [`SinkStore`]. The production implementation, [`FileStore`],
//! writes `<transfer_dir>/<name><suffix>` on disk; [`MemoryStore`] keeps
//! everything in memory so framing and reception logic can be exercised
//! without touching the filesystem.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Default suffix appended to received file names.
pub const RECEIVED_SUFFIX: &str = ".snt";

/// A named binary destination for received file bytes.
///
/// Blocks are appended in declared order; `finish` flushes whatever the
/// backing store buffers.
#[async_trait]
pub trait Sink: Send {
    async fn write_block(&mut self, block: &[u8]) -> io::Result<()>;
    async fn finish(&mut self) -> io::Result<()>;
}

/// Opens sinks by declared name.
#[async_trait]
pub trait SinkStore: Send + Sync {
    async fn open(&self, name: &str) -> io::Result<Box<dyn Sink>>;
}

/// On-disk sink store rooted at a transfer directory.
///
/// Only the final path component of the declared name is used, so a peer
/// cannot steer writes outside the transfer directory.
pub struct FileStore {
    transfer_dir: PathBuf,
    suffix: String,
}

impl FileStore {
    /// Create a store rooted at `transfer_dir`, creating the directory if
    /// it does not exist.
    pub fn new(transfer_dir: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_suffix(transfer_dir, RECEIVED_SUFFIX)
    }

    pub fn with_suffix(transfer_dir: impl Into<PathBuf>, suffix: &str) -> io::Result<Self> {
        let transfer_dir = transfer_dir.into();
        std::fs::create_dir_all(&transfer_dir)?;
        info!(dir = %transfer_dir.display(), "file store opened");
        Ok(Self {
            transfer_dir,
            suffix: suffix.to_string(),
        })
    }

    /// Full path a declared name resolves to.
    pub fn sink_path(&self, name: &str) -> PathBuf {
        let base = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.transfer_dir.join(format!("{base}{}", self.suffix))
    }
}

#[async_trait]
impl SinkStore for FileStore {
    async fn open(&self, name: &str) -> io::Result<Box<dyn Sink>> {
        let path = self.sink_path(name);
        let file = File::create(&path).await?;
        Ok(Box::new(FileSink { file }))
    }
}

struct FileSink {
    file: File,
}

#[async_trait]
impl Sink for FileSink {
    async fn write_block(&mut self, block: &[u8]) -> io::Result<()> {
        self.file.write_all(block).await
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.file.flush().await
    }
}

/// In-memory sink store for tests and embedding.
///
/// Cloning shares the underlying map; `contents` exposes what each named
/// sink received. `fail_open` makes every subsequent `open` report the
/// sink as unavailable, for exercising the discard path.
#[derive(Clone, Default)]
pub struct MemoryStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_open: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(name).cloned()
    }

    pub fn fail_open(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_open.lock() {
            *flag = fail;
        }
    }
}

#[async_trait]
impl SinkStore for MemoryStore {
    async fn open(&self, name: &str) -> io::Result<Box<dyn Sink>> {
        let failing = self.fail_open.lock().map(|f| *f).unwrap_or(false);
        if failing {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot open sink {name}"),
            ));
        }
        Ok(Box::new(MemorySink {
            name: name.to_string(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }
}

struct MemorySink {
    name: String,
    buffer: Vec<u8>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

#[async_trait]
impl Sink for MemorySink {
    async fn write_block(&mut self, block: &[u8]) -> io::Result<()> {
        self.buffer.extend_from_slice(block);
        // Publish after every block so partial transfers are observable.
        if let Ok(mut files) = self.files.lock() {
            files.insert(self.name.clone(), self.buffer.clone());
        }
        Ok(())
    }

    async fn finish(&mut self) -> io::Result<()> {
        if let Ok(mut files) = self.files.lock() {
            files.insert(self.name.clone(), self.buffer.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_path_appends_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.sink_path("foo"), dir.path().join("foo.snt"));
    }

    #[test]
    fn test_sink_path_ignores_directory_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(
            store.sink_path("../../etc/passwd"),
            dir.path().join("passwd.snt")
        );
    }

    #[tokio::test]
    async fn test_file_store_writes_blocks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let mut sink = store.open("report").await.unwrap();
        sink.write_block(b"abc").await.unwrap();
        sink.write_block(b"def").await.unwrap();
        sink.finish().await.unwrap();
        drop(sink);

        let written = std::fs::read(dir.path().join("report.snt")).unwrap();
        assert_eq!(written, b"abcdef");
    }

    #[tokio::test]
    async fn test_memory_store_records_and_fails_on_demand() {
        let store = MemoryStore::new();
        let mut sink = store.open("foo").await.unwrap();
        sink.write_block(b"12345").await.unwrap();
        sink.finish().await.unwrap();
        assert_eq!(store.contents("foo").unwrap(), b"12345");

        store.fail_open(true);
        assert!(store.open("bar").await.is_err());
    }
}
