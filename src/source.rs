//! Image file loading
//!
//! Reads raw image bytes from disk, or from memory in tests.

use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Returns the full, non-empty contents of the image at `path`.
    async fn read_image(&self, path: &Path) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: ImageSource + ?Sized> ImageSource for Arc<T> {
    async fn read_image(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read_image(path).await
    }
}

fn ensure_non_empty(path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("image file {} is empty", path.display()),
        )
        .into());
    }
    Ok(bytes)
}

#[derive(Debug, Default, Clone)]
pub struct FsImageSource;

#[async_trait]
impl ImageSource for FsImageSource {
    async fn read_image(&self, path: &Path) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::debug!("Failed to read image {}: {}", path.display(), e);
            io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
        ensure_non_empty(path, bytes)
    }
}

pub struct MockImageSource {
    files: HashMap<PathBuf, Vec<u8>>,
    read_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            read_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        self.files.insert(path.into(), bytes);
        self
    }

    pub fn get_read_count(&self) -> usize {
        *self.read_count.lock().unwrap()
    }
}

impl Default for MockImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn read_image(&self, path: &Path) -> Result<Vec<u8>> {
        *self.read_count.lock().unwrap() += 1;

        let bytes = self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found", path.display()),
            )
        })?;
        ensure_non_empty(path, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn test_fs_source_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.jpg");
        std::fs::write(&path, [0xFFu8, 0xD8, 0xFF]).unwrap();

        let bytes = FsImageSource.read_image(&path).await.unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_fs_source_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jpg");

        let err = FsImageSource.read_image(&path).await.unwrap_err();
        match err {
            Error::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert!(e.to_string().contains("missing.jpg"));
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fs_source_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        let err = FsImageSource.read_image(&path).await.unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::InvalidData));
    }

    #[tokio::test]
    async fn test_mock_source_counts_reads() {
        let source = MockImageSource::new().with_file("a.png", vec![1]);

        assert_eq!(source.read_image(Path::new("a.png")).await.unwrap(), vec![1]);
        assert!(source.read_image(Path::new("b.png")).await.is_err());
        assert_eq!(source.get_read_count(), 2);
    }
}
