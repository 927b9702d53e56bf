use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::BlobResult;

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct StoredAttachment {
    pub key: String,
    pub size_bytes: u64,
}

/// Core attachment operations - implemented by all storage backends.
///
/// Keys are relative paths; backends decide where they resolve.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store bytes under a key.
    async fn put(&self, key: &str, bytes: Bytes) -> BlobResult<StoredAttachment>;

    /// Read the full content of a stored attachment.
    async fn read(&self, key: &str) -> BlobResult<Bytes>;

    /// Delete a stored attachment. Deleting a missing key is an error.
    async fn delete(&self, key: &str) -> BlobResult<()>;

    /// Whether a key currently exists.
    async fn exists(&self, key: &str) -> BlobResult<bool>;
}

/// A fresh storage key for an uploaded file, namespaced under
/// `attachments/` and made collision-free with a uuid.
pub fn attachment_key(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("attachments/{}-{}", Uuid::new_v4(), safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_keys_are_namespaced_and_sanitized() {
        let key = attachment_key("weird name?.png");
        assert!(key.starts_with("attachments/"));
        assert!(key.ends_with("weird_name_.png"));
        assert!(!key.contains(' '));
    }
}
