//! File Access
//!
//! Command handlers never touch the filesystem directly. They go through
//! [`FileAccess`], which the emulator implements on top of `tokio::fs` and
//! tests can replace with slow or failing variants.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::path::Path;

/// Read-only access to distribution files.
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Returns the size of a file in bytes.
    async fn size(&self, path: &Path) -> io::Result<u64>;

    /// Reads the whole file.
    async fn read(&self, path: &Path) -> io::Result<Bytes>;
}

/// Non-blocking access to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

#[async_trait]
impl FileAccess for LocalFiles {
    async fn size(&self, path: &Path) -> io::Result<u64> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(metadata.len())
    }

    async fn read(&self, path: &Path) -> io::Result<Bytes> {
        let contents = tokio::fs::read(path).await?;
        Ok(Bytes::from(contents))
    }
}
