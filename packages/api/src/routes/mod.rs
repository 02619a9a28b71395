//! # HTTP routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET/POST | `/login` | [`auth::login_page`] / [`auth::login`] |
//! | GET/POST | `/register` | [`auth::register_page`] / [`auth::register`] |
//! | GET | `/logout` | [`auth::logout`] |
//! | GET | `/`, `/index` | [`browse::index`] |
//! | POST | `/search` | [`browse::search`] |
//! | GET | `/filter_notes_by_category/{id}` | [`browse::filter_by_category`] |
//! | GET/POST | `/create_category` | [`categories::create_page`] / [`categories::create`] |
//! | GET/POST | `/edit_category/{id}` | [`categories::edit_page`] / [`categories::update`] |
//! | POST | `/delete_category/{id}` | [`categories::delete`] |
//! | GET/POST | `/create_edit_note[/{id}]` | [`notes::create_page`] / [`notes::edit_page`] / [`notes::create`] / [`notes::update`] |
//! | POST | `/delete_note/{id}` | [`notes::delete`] |
//! | GET | `/static/*` | static asset root, uploads included |
//!
//! GET handlers answer with JSON view models carrying the pending flash
//! messages. POST handlers answer with a redirect: user-facing failures are
//! queued as flash messages and send the user back to the form (or to the
//! index when the resource is not found), internal failures become a 500.
//!
//! The session layer is installed by the caller, so tests can swap in an
//! in-memory session store.

pub mod auth;
pub mod browse;
pub mod categories;
pub mod notes;

use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use store::{CategoryInfo, NoteInfo, UserInfo};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::flash;
use crate::AppState;

/// Largest accepted request body; bounds image uploads.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const INDEX_URL: &str = "/index";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.config.storage.static_root.clone());

    Router::new()
        .route("/", get(browse::index))
        .route(INDEX_URL, get(browse::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/search", post(browse::search))
        .route("/filter_notes_by_category/{id}", get(browse::filter_by_category))
        .route(
            "/create_category",
            get(categories::create_page).post(categories::create),
        )
        .route(
            "/edit_category/{id}",
            get(categories::edit_page).post(categories::update),
        )
        .route("/delete_category/{id}", post(categories::delete))
        .route("/create_edit_note", get(notes::create_page).post(notes::create))
        .route("/create_edit_note/{id}", get(notes::edit_page).post(notes::update))
        .route("/delete_note/{id}", post(notes::delete))
        .nest_service(store::models::STATIC_URL_PREFIX, static_files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Queue a user-facing error as flash messages and redirect; internal errors
/// pass through. Not-found always lands on the index.
pub async fn redirect_with_flash(session: &Session, err: AppError, back_to: &str) -> Result<Redirect> {
    let Some(messages) = err.flash_messages() else {
        return Err(err);
    };
    flash::push_all(session, messages).await?;
    let target = if err.is_not_found() { INDEX_URL } else { back_to };
    Ok(Redirect::to(target))
}

/// `/login`, `/register` and `/create_category`.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub title: &'static str,
    pub flashes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub user: UserInfo,
    pub categories: Vec<CategoryInfo>,
    pub notes: Vec<NoteInfo>,
    pub flashes: Vec<String>,
}

/// Search results and category filter.
#[derive(Debug, Serialize)]
pub struct NotesPage {
    pub query: Option<String>,
    pub category: Option<CategoryInfo>,
    pub notes: Vec<NoteInfo>,
    pub flashes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub title: &'static str,
    pub category: CategoryInfo,
    pub flashes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteFormPage {
    /// "Create" or "Edit".
    pub mode: &'static str,
    pub note: Option<NoteInfo>,
    /// Choices for the category selector.
    pub categories: Vec<CategoryInfo>,
    pub flashes: Vec<String>,
}
