use uuid::Uuid;
use sanitize_filename::sanitize;
use std::path::{Path, PathBuf};

/// Request-scoped staging file for an uploaded image.
///
/// The file is removed when the guard drops, so every handler exit path
/// (success, decode failure, detector failure) releases the upload.
pub struct StagedUpload {
    path: PathBuf,
    retained: bool,
}

impl StagedUpload {
    pub fn new(folder: &Path, original_name: Option<&str>) -> Self {
        let suffix = original_name
            .map(sanitize)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload.jpg".to_string());
        let path = folder.join(format!("{}_{}", Uuid::new_v4(), suffix));
        Self {
            path,
            retained: false,
        }
    }

    /// Stage under an exact name, for destinations whose naming the caller
    /// controls (for example timestamp-named browser uploads).
    pub fn named(folder: &Path, file_name: &str) -> Self {
        Self {
            path: folder.join(file_name),
            retained: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the staged file on disk instead of deleting it on drop.
    pub fn into_path(mut self) -> PathBuf {
        self.retained = true;
        self.path.clone()
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.retained {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_is_removed_on_drop() {
        let folder = tempfile::tempdir().unwrap();
        let staged = StagedUpload::new(folder.path(), Some("lot.jpg"));
        std::fs::write(staged.path(), b"bytes").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn retained_file_survives_the_guard() {
        let folder = tempfile::tempdir().unwrap();
        let staged = StagedUpload::new(folder.path(), None);
        std::fs::write(staged.path(), b"bytes").unwrap();
        let path = staged.into_path();
        assert!(path.exists());
    }

    #[test]
    fn hostile_filenames_are_sanitized() {
        let folder = tempfile::tempdir().unwrap();
        let staged = StagedUpload::new(folder.path(), Some("../../etc/passwd"));
        assert!(staged.path().starts_with(folder.path()));
    }
}
