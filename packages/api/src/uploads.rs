//! # Image storage under the static root
//!
//! Note images are written to `<static_root>/uploads/<user_id>/` and served by
//! the `/static` route. Each stored file gets a random token prefix so two
//! notes uploading `cat.png` never share (or delete) the same file.
//!
//! Writes go to a temporary file first and are renamed into place. Removal is
//! best effort: a file that is already gone is fine, other failures are logged
//! and swallowed since the database is the source of truth.

use std::path::{Component, Path, PathBuf};

use store::uploads::{upload_path, UPLOADS_DIR};
use tokio::fs;
use uuid::Uuid;

use crate::error::Result;

#[derive(Clone, Debug)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(static_root: PathBuf) -> Self {
        Self { root: static_root }
    }

    /// Write an image for `user_id` and return its path relative to the
    /// static root. `name` must come from `store::uploads::checked_image_name`.
    pub async fn save(&self, user_id: i64, name: &str, data: &[u8]) -> Result<String> {
        let stored_name = format!("{}_{}", Uuid::new_v4().simple(), name);
        let relative = upload_path(user_id, &stored_name);
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Stored image {} ({} bytes)", relative, data.len());
        Ok(relative)
    }

    /// Absolute path for a stored relative path, if it stays inside the
    /// uploads directory.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let inside_uploads = relative.starts_with(UPLOADS_DIR)
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        inside_uploads.then(|| self.root.join(relative))
    }

    /// Delete a stored image, ignoring files that are already gone.
    pub async fn remove(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            tracing::warn!("Refusing to remove image outside uploads: {}", relative);
            return;
        };
        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Removed image {}", relative),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove image {}: {}", relative, e),
        }
    }
}
