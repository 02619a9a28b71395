//! Index, search and category filter. All read-only and scoped to the
//! signed-in user.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use store::forms::SearchForm;
use tower_sessions::Session;

use super::{IndexPage, NotesPage, INDEX_URL};
use crate::auth::CurrentUser;
use crate::error::Result;
use crate::flash;
use crate::models::Note;
use crate::AppState;

fn infos(notes: &[Note]) -> Vec<store::NoteInfo> {
    notes.iter().map(Note::to_info).collect()
}

pub async fn index(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<IndexPage>> {
    let categories = state.repo.list_categories(user.id).await?;
    let notes = state.repo.list_notes(user.id).await?;

    Ok(Json(IndexPage {
        user: user.to_info(),
        categories: categories.iter().map(|c| c.to_info()).collect(),
        notes: infos(&notes),
        flashes: flash::take(&session).await?,
    }))
}

pub async fn search(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> Result<Response> {
    let Ok(query) = form.validate() else {
        return Ok(Redirect::to(INDEX_URL).into_response());
    };

    let notes = state.repo.search_notes(user.id, &query).await?;
    Ok(Json(NotesPage {
        query: Some(query),
        category: None,
        notes: infos(&notes),
        flashes: flash::take(&session).await?,
    })
    .into_response())
}

pub async fn filter_by_category(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(category_id): Path<i64>,
) -> Result<Json<NotesPage>> {
    let (category, notes) = match state.repo.find_category(user.id, category_id).await? {
        Some(category) => {
            let notes = state.repo.list_notes_in_category(user.id, category.id).await?;
            (Some(category.to_info()), infos(&notes))
        }
        None => {
            flash::push(&session, "Category not found.").await?;
            (None, Vec::new())
        }
    };

    Ok(Json(NotesPage {
        query: None,
        category,
        notes,
        flashes: flash::take(&session).await?,
    }))
}
