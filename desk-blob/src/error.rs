use thiserror::Error;

/// Result type for attachment operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during attachment operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Attachment not found: {key}")]
    NotFound { key: String },

    #[error("Invalid attachment key: {message}")]
    InvalidKey { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BlobError {
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn invalid_key<S: Into<String>>(message: S) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}
