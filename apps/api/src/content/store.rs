//! Read-only access to the content tree.
//!
//! `AppState` holds an `Arc<dyn ContentStore>`; the engine only ever asks two
//! questions of it: does a key exist, and what are its bytes.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

/// Keys are paths relative to the store root, e.g. `ncert/class11/chapter_01/mcq.json`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// `Ok(false)` means absent; `Err` is reserved for failures other than absence.
    async fn exists(&self, key: &Path) -> io::Result<bool>;

    async fn read(&self, key: &Path) -> io::Result<Bytes>;
}

/// Filesystem-backed store rooted at `CONTENT_ROOT`.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn exists(&self, key: &Path) -> io::Result<bool> {
        match tokio::fs::metadata(self.root.join(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            // A path segment naming a regular file fails with ENOTDIR.
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn read(&self, key: &Path) -> io::Result<Bytes> {
        tokio::fs::read(self.root.join(key)).await.map(Bytes::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exists_distinguishes_files_from_dirs_and_absence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b/c/ch")).unwrap();
        std::fs::write(dir.path().join("b/c/ch/mcq.json"), "[]").unwrap();
        let store = FsContentStore::new(dir.path());

        assert!(store.exists(Path::new("b/c/ch/mcq.json")).await.unwrap());
        assert!(!store.exists(Path::new("b/c/ch")).await.unwrap());
        assert!(!store.exists(Path::new("b/c/ch/oneword.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_through_a_file_segment_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("placeholder.png"), b"img").unwrap();
        let store = FsContentStore::new(dir.path());

        let key = Path::new("placeholder.png/class11/chapter_01/questions.json");
        assert!(!store.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.json"), "{\"a\":1}").unwrap();
        let store = FsContentStore::new(dir.path());

        let bytes = store.read(Path::new("x.json")).await.unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }
}
