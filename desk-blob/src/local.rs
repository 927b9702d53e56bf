use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{AttachmentStore, BlobError, BlobResult, StoredAttachment};

/// Local-disk backend: keys resolve to files under a root directory.
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under the root, rejecting traversal.
    fn resolve(&self, key: &str) -> BlobResult<PathBuf> {
        let rel = Path::new(key);
        if key.is_empty() || rel.is_absolute() {
            return Err(BlobError::invalid_key(format!("not a relative path: {key}")));
        }
        for part in rel.components() {
            match part {
                Component::Normal(_) => {}
                _ => {
                    return Err(BlobError::invalid_key(format!(
                        "key escapes the storage root: {key}"
                    )))
                }
            }
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl AttachmentStore for LocalDiskStore {
    async fn put(&self, key: &str, bytes: Bytes) -> BlobResult<StoredAttachment> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let size_bytes = bytes.len() as u64;
        tokio::fs::write(&path, &bytes).await?;

        Ok(StoredAttachment {
            key: key.to_string(),
            size_bytes,
        })
    }

    async fn read(&self, key: &str) -> BlobResult<Bytes> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::not_found(key))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::not_found(key))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn temp_store() -> LocalDiskStore {
        let root = std::env::temp_dir().join(format!("desk-blob-test-{}", Uuid::new_v4()));
        LocalDiskStore::new(root)
    }

    #[tokio::test]
    async fn put_read_delete_roundtrip() {
        let store = temp_store();
        let key = "attachments/abc-report.txt";

        let stored = store.put(key, Bytes::from_static(b"hello")).await.unwrap();
        assert_eq!(stored.size_bytes, 5);
        assert!(store.exists(key).await.unwrap());

        let content = store.read(key).await.unwrap();
        assert_eq!(&content[..], b"hello");

        store.delete(key).await.unwrap();
        assert!(!store.exists(key).await.unwrap());
        assert!(matches!(
            store.read(key).await.unwrap_err(),
            BlobError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let store = temp_store();
        let err = store
            .put("../outside.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::InvalidKey { .. }));

        let err = store.read("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, BlobError::InvalidKey { .. }));
    }
}
