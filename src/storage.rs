//! Media Storage
//!
//! Uploaded product photos live on local disk under the configured
//! media root and are served back at `/media/{path}`. Object paths are
//! namespaced by product id with a randomized file name so re-uploads
//! never collide.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            base_url: base_url.into(),
        })
    }

    /// Relative object path for a new product photo.
    pub fn object_path(product_id: Uuid, extension: &str) -> String {
        format!("products/{}/{}.{}", product_id, Uuid::new_v4(), extension)
    }

    /// Public URL a stored object is reachable at.
    pub fn public_url(&self, object_path: &str) -> String {
        format!("{}/media/{}", self.base_url, object_path)
    }

    pub fn save(&self, object_path: &str, bytes: &[u8]) -> std::io::Result<()> {
        let full = self.root.join(object_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, bytes)
    }

    pub fn remove(&self, object_path: &str) -> std::io::Result<()> {
        fs::remove_file(self.root.join(object_path))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Preferred file extension for a MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .copied()
            .unwrap_or("bin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "https://shop.example.com").unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_and_remove() {
        let (_dir, store) = store();
        let path = MediaStore::object_path(Uuid::new_v4(), "png");
        store.save(&path, b"not really a png").unwrap();
        assert!(store.root().join(&path).exists());
        store.remove(&path).unwrap();
        assert!(!store.root().join(&path).exists());
    }

    #[test]
    fn test_remove_missing_fails() {
        let (_dir, store) = store();
        assert!(store.remove("products/nope.png").is_err());
    }

    #[test]
    fn test_object_path_namespaced_by_product() {
        let product_id = Uuid::new_v4();
        let a = MediaStore::object_path(product_id, "jpg");
        let b = MediaStore::object_path(product_id, "jpg");
        assert!(a.starts_with(&format!("products/{product_id}/")));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_url() {
        let (_dir, store) = store();
        assert_eq!(
            store.public_url("products/x/y.jpg"),
            "https://shop.example.com/media/products/x/y.jpg"
        );
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("application/unknown"), "bin");
    }
}
