//! Disk-backed upload store.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::ports::{UploadError, UploadStore};

/// Extensions accepted for cover images. The client-supplied filename is
/// never trusted beyond this check.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Writes uploads into a shared directory under UUID-keyed names, so
/// concurrent requests never collide.
pub struct DiskUploadStore {
    root: PathBuf,
}

impl DiskUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn extension_of(original_name: &str) -> Result<String, UploadError> {
        let ext = std::path::Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| UploadError::UnsupportedType(original_name.to_string()))?;

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::UnsupportedType(ext));
        }
        Ok(ext)
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String, UploadError> {
        let ext = Self::extension_of(original_name)?;
        let name = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;
        let path = self.root.join(&name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;

        tracing::debug!(file = %name, bytes = data.len(), "Stored cover image");

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_file_and_returns_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUploadStore::new(dir.path());

        let path = store.store("cover.PNG", b"fake image bytes").await.unwrap();

        assert!(path.ends_with(".png"));
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, b"fake image bytes");
    }

    #[tokio::test]
    async fn rejects_unlisted_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUploadStore::new(dir.path());

        let result = store.store("payload.exe", b"nope").await;

        assert!(matches!(
            result.unwrap_err(),
            UploadError::UnsupportedType(_)
        ));
    }

    #[tokio::test]
    async fn rejects_name_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUploadStore::new(dir.path());

        let result = store.store("noext", b"data").await;

        assert!(matches!(
            result.unwrap_err(),
            UploadError::UnsupportedType(_)
        ));
    }

    #[tokio::test]
    async fn trailing_slash_in_root_does_not_double_up() {
        let dir = tempfile::tempdir().unwrap();
        let root = format!("{}/", dir.path().display());
        let store = DiskUploadStore::new(root);

        let path = store.store("cover.jpg", b"bytes").await.unwrap();

        assert!(!path.contains("//"));
        assert!(std::fs::read(&path).is_ok());
    }

    #[tokio::test]
    async fn generated_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUploadStore::new(dir.path());

        let a = store.store("one.jpg", b"a").await.unwrap();
        let b = store.store("one.jpg", b"b").await.unwrap();

        assert_ne!(a, b);
    }
}
