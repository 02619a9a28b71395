//! Upload naming rules: extension allow-list, filename sanitizing and the
//! per-user layout under the static root.
//!
//! ```text
//! <static_root>/
//! └── uploads/
//!     └── <user_id>/
//!         └── <token>_<sanitized name>
//! ```

use thiserror::Error;

/// Image extensions accepted for note attachments (compared lowercased).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Directory below the static root that holds every user's uploads.
pub const UPLOADS_DIR: &str = "uploads";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadNameError {
    #[error("File type not allowed. Allowed types: png, jpg, jpeg, gif.")]
    ExtensionNotAllowed,

    #[error("Invalid file name.")]
    InvalidName,
}

/// True when the name has an extension on the allow-list.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory parts are dropped, whitespace becomes `_`, anything outside ASCII
/// alphanumerics, `.`, `-` and `_` is removed, and leading dots or underscores
/// are stripped. Returns `None` when nothing usable remains.
pub fn secure_filename(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Validate an uploaded filename and return its sanitized form.
pub fn checked_image_name(filename: &str) -> Result<String, UploadNameError> {
    if !allowed_file(filename) {
        return Err(UploadNameError::ExtensionNotAllowed);
    }
    let name = secure_filename(filename).ok_or(UploadNameError::InvalidName)?;
    // "ñ.png" sanitizes to "png", which has no extension left.
    if allowed_file(&name) {
        Ok(name)
    } else {
        Err(UploadNameError::InvalidName)
    }
}

/// Path of a stored upload relative to the static root, always `/`-separated.
pub fn upload_path(user_id: i64, stored_name: &str) -> String {
    format!("{UPLOADS_DIR}/{user_id}/{stored_name}")
}
