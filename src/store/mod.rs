// File-backed document store
// One JSON file holds every entity; every operation runs its whole
// load/mutate/persist cycle under a single reader-writer lock.

pub mod document;
pub mod error;

pub use document::Document;
pub use error::StoreError;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Handle to the persisted document
///
/// Cloning is cheap; all clones share the same lock.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    lock: RwLock<()>,
}

impl DocumentStore {
    /// Open the store at `path`
    ///
    /// Creates the parent directory when needed and parses any existing file
    /// so a corrupt store is reported at startup instead of on first request.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io("create directory", parent, e))?;
        }

        let store = Self {
            inner: Arc::new(StoreInner {
                path,
                lock: RwLock::new(()),
            }),
        };

        let document = store.load().await?;
        info!(
            "Document store opened at {} ({} users, {} chirps)",
            store.path().display(),
            document.users.len(),
            document.chirps.len()
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Read the current document under a shared lock
    pub async fn load(&self) -> Result<Document, StoreError> {
        let _guard = self.inner.lock.read().await;
        self.read_document().await
    }

    /// Run a read-only projection over a consistent snapshot
    ///
    /// Runs concurrently with other readers, never with a writer.
    pub async fn with_read_lock<T, E, F>(&self, projection: F) -> Result<T, E>
    where
        F: FnOnce(&Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.inner.lock.read().await;
        let document = self.read_document().await?;
        projection(&document)
    }

    /// Load, mutate and persist the document as one exclusive step
    ///
    /// If `mutation` returns an error nothing is written.
    pub async fn with_write_lock<T, E, F>(&self, mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.inner.lock.write().await;
        let mut document = self.read_document().await?;
        let result = mutation(&mut document)?;
        self.persist(&document).await?;
        Ok(result)
    }

    /// Delete the store file at `path` so the next open starts empty
    ///
    /// Runs before the store is opened; a missing file is not an error.
    pub async fn remove(path: &Path) -> Result<(), StoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!("Deleted store file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io("delete", path, e)),
        }
    }

    /// Wait for in-flight writers to finish before shutdown
    pub async fn close(self) {
        let _guard = self.inner.lock.write().await;
        info!("Document store at {} closed", self.path().display());
    }

    async fn read_document(&self) -> Result<Document, StoreError> {
        let path = self.path();
        let raw = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store file {} missing, using empty document", path.display());
                return Ok(Document::default());
            }
            Err(e) => return Err(StoreError::io("read", path, e)),
        };

        // An empty file is what a freshly created store looks like
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }

        let mut document: Document =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        document.normalize_counters()?;
        Ok(document)
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let path = self.path();
        let payload = serde_json::to_vec_pretty(document).map_err(StoreError::Encode)?;

        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|e| StoreError::io("write", &temp_path, e))?;

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                warn!(
                    "Failed to remove temporary store file {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(StoreError::io("replace", path, e));
        }

        debug!(
            "Persisted document ({} users, {} chirps)",
            document.users.len(),
            document.chirps.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chirps::models::Chirp;

    async fn temp_store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocumentStore::open(dir.path().join("database.json"))
            .await
            .expect("open store");
        (dir, store)
    }

    fn add_chirp(doc: &mut Document, body: &str) -> Result<Chirp, StoreError> {
        let id = doc.allocate_chirp_id()?;
        let chirp = Chirp {
            id,
            body: body.to_string(),
            author_id: 1,
        };
        doc.chirps.insert(id, chirp.clone());
        Ok(chirp)
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let (_dir, store) = temp_store().await;
        let doc = store.load().await.expect("load");
        assert_eq!(doc, Document::default());
    }

    #[tokio::test]
    async fn test_load_empty_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("database.json");
        std::fs::write(&path, "").expect("create empty file");

        let store = DocumentStore::open(&path).await.expect("open store");
        assert!(store.load().await.expect("load").chirps.is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("database.json");
        std::fs::write(&path, "{ not json").expect("write garbage");

        let result = DocumentStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_load_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should be cannot be read as a file
        let path = dir.path().join("database.json");
        std::fs::create_dir(&path).expect("create dir");

        let result = DocumentStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn test_write_persists_and_survives_reopen() {
        let (dir, store) = temp_store().await;

        let created = store
            .with_write_lock(|doc| add_chirp(doc, "hello"))
            .await
            .expect("write");
        assert_eq!(created.id, 1);

        let reopened = DocumentStore::open(dir.path().join("database.json"))
            .await
            .expect("reopen");
        let doc = reopened.load().await.expect("load");
        assert_eq!(doc.chirps.get(&1), Some(&created));
        assert_eq!(doc.next_chirp_id, 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_persisted() {
        let (_dir, store) = temp_store().await;

        let result: Result<(), StoreError> = store
            .with_write_lock(|doc| {
                add_chirp(doc, "discarded")?;
                Err(StoreError::Encode(serde_json::Error::io(std::io::Error::other("boom"))))
            })
            .await;
        assert!(result.is_err());

        let doc = store.load().await.expect("load");
        assert!(doc.chirps.is_empty());
    }

    #[tokio::test]
    async fn test_no_temporary_files_left_behind() {
        let (dir, store) = temp_store().await;
        for i in 0..5 {
            store
                .with_write_lock(|doc| add_chirp(doc, &format!("chirp {}", i)))
                .await
                .expect("write");
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("database.json")]);
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_lose_updates() {
        let (_dir, store) = temp_store().await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .with_write_lock(|doc| add_chirp(doc, &format!("chirp {}", i)))
                    .await
                    .expect("write")
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("join"));
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());

        let doc = store.load().await.expect("load");
        assert_eq!(doc.chirps.len(), 20);
    }

    #[tokio::test]
    async fn test_read_projection() {
        let (_dir, store) = temp_store().await;
        store
            .with_write_lock(|doc| add_chirp(doc, "one"))
            .await
            .expect("write");

        let count = store
            .with_read_lock(|doc| Ok::<_, StoreError>(doc.chirps.len()))
            .await
            .expect("read");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_remove_deletes_file_even_when_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("database.json");
        std::fs::write(&path, "{ not json").expect("write garbage");

        DocumentStore::remove(&path).await.expect("remove");
        assert!(!path.exists());

        let store = DocumentStore::open(&path).await.expect("open after remove");
        assert!(store.load().await.expect("load").chirps.is_empty());

        // Removing an already missing file is fine
        DocumentStore::remove(&path).await.expect("second remove");
    }
}
