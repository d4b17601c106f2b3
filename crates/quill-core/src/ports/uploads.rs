//! Upload storage port.

use async_trait::async_trait;

/// Stores uploaded cover images and returns the relative path persisted
/// on the post document.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store `data` under a freshly generated name keyed off the
    /// original file's extension. The client-supplied name is used only
    /// to derive the extension, which must pass the whitelist.
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String, UploadError>;
}

/// Upload storage errors.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Filesystem error: {0}")]
    Io(String),
}
