//! # Client-safe view models
//!
//! The server keeps full database rows (with password hashes, raw foreign keys
//! and timestamps) inside the `api` crate. What leaves the server is one of the
//! projections below: `Serialize + Deserialize + PartialEq` so they can be
//! returned as JSON view models and compared in tests.
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`UserInfo`] | The signed-in user. Never carries the password hash. |
//! | [`CategoryInfo`] | A category owned by the current user. |
//! | [`NoteInfo`] | A note owned by the current user, with its category name resolved and the image reference turned into a public URL. |

use serde::{Deserialize, Serialize};

/// URL prefix under which the static asset root is served.
pub const STATIC_URL_PREFIX: &str = "/static";

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// A category as shown in lists and category selectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: String,
}

/// A note as shown on the index, search and edit views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteInfo {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    /// Name of the category, resolved for display.
    pub category: Option<String>,
    /// Stored path relative to the static root: "uploads/3/ab12_cat.png"
    pub image_path: Option<String>,
    /// Public URL of the stored image: "/static/uploads/3/ab12_cat.png"
    pub image_url: Option<String>,
}

/// Public URL for a path stored relative to the static root.
pub fn static_url(relative: &str) -> String {
    format!(
        "{}/{}",
        STATIC_URL_PREFIX,
        relative.trim_start_matches('/').replace('\\', "/")
    )
}
