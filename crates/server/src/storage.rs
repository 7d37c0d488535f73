//! On-disk storage for uploaded receipt images.
//!
//! Images live under a configurable directory and are referenced from the
//! database by relative file name. File names are timestamped and sanitized
//! so uploads cannot escape the storage directory.

use std::path::{Path, PathBuf};

use chrono::Utc;

/// Stores receipt images under a root directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the given directory. The directory is created
    /// when missing.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist image bytes, returning the stored file name.
    ///
    /// The name combines an upload timestamp with the sanitized client file
    /// name, e.g. `20240102_153045123_receipt.jpg`.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S%3f");
        let file_name = format!("{timestamp}_{}", sanitize_file_name(original_name));
        std::fs::write(self.root.join(&file_name), bytes)?;
        Ok(file_name)
    }

    /// Delete a stored image.
    ///
    /// A missing file is not an error: the record is being removed either
    /// way, and the image may already be gone.
    pub fn delete(&self, file_name: &str) {
        let path = self.root.join(sanitize_file_name(file_name));
        if let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(file = %path.display(), "failed to delete image file: {e}");
        }
    }
}

/// Reduce a client-supplied file name to a safe single path component.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Guard against names that are all separators or dot sequences.
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("receipt.jpg"), "receipt.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("..."), "upload");
    }

    #[test]
    fn test_save_and_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ImageStore::new(dir.path()).expect("store");

        let name = store.save("receipt.jpg", b"fake image").expect("save");
        assert!(name.ends_with("_receipt.jpg"));

        let path = store.root().join(&name);
        assert_eq!(std::fs::read(&path).expect("read"), b"fake image");

        store.delete(&name);
        assert!(!path.exists());

        // Deleting again is silently fine.
        store.delete(&name);
    }

    #[test]
    fn test_delete_cannot_escape_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outside = dir.path().join("outside.txt");
        std::fs::write(&outside, b"keep me").expect("write");

        let store_root = dir.path().join("store");
        let store = ImageStore::new(&store_root).expect("store");

        store.delete("../outside.txt");
        assert!(outside.exists());
    }
}
