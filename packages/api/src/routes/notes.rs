//! Note create, edit and delete.
//!
//! The note form is posted as `multipart/form-data` because it may carry an
//! image. Text fields, the image name and the category choice are validated
//! together, so one submission reports every problem at once. The image is
//! written only after validation passes; a replaced image is removed only
//! after the new row is committed.

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use store::forms::NoteForm;
use store::uploads::checked_image_name;
use store::{FieldError, ValidationErrors};
use tower_sessions::Session;

use super::{redirect_with_flash, NoteFormPage, INDEX_URL};
use crate::auth::CurrentUser;
use crate::db::NoteDraft;
use crate::error::{AppError, Result};
use crate::flash;
use crate::models::Note;
use crate::AppState;

/// A file part from the note form.
#[derive(Debug)]
struct ImageUpload {
    filename: String,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct NoteSubmission {
    form: NoteForm,
    image: Option<ImageUpload>,
}

async fn read_submission(mut multipart: Multipart) -> Result<NoteSubmission> {
    let mut submission = NoteSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => submission.form.title = field.text().await?,
            "content" => submission.form.content = field.text().await?,
            "category" | "category_id" => submission.form.category = Some(field.text().await?),
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if !filename.is_empty() {
                    submission.image = Some(ImageUpload {
                        filename,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(submission)
}

async fn form_page(state: &AppState, session: &Session, user_id: i64, note_id: Option<i64>) -> Result<Response> {
    let note = match note_id {
        Some(id) => match state.repo.get_note(user_id, id).await {
            Ok(note) => Some(note.to_info()),
            Err(e) => return Ok(redirect_with_flash(session, e, INDEX_URL).await?.into_response()),
        },
        None => None,
    };
    let categories = state.repo.list_categories(user_id).await?;

    Ok(Json(NoteFormPage {
        mode: if note_id.is_some() { "Edit" } else { "Create" },
        note,
        categories: categories.iter().map(|c| c.to_info()).collect(),
        flashes: flash::take(session).await?,
    })
    .into_response())
}

pub async fn create_page(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    form_page(&state, &session, user.id, None).await
}

pub async fn edit_page(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response> {
    form_page(&state, &session, user.id, Some(id)).await
}

/// Validate, store the image, then write the row.
async fn save_note(state: &AppState, user_id: i64, existing: Option<&Note>, submission: NoteSubmission) -> Result<()> {
    let mut errors = ValidationErrors::default();

    let fields = match submission.form.validate() {
        Ok(fields) => Some(fields),
        Err(e) => {
            errors.0.extend(e.0);
            None
        }
    };

    let image = match submission.image {
        Some(upload) => match checked_image_name(&upload.filename) {
            Ok(name) => Some((name, upload.data)),
            Err(e) => {
                errors.0.push(FieldError::new("image", e.to_string()));
                None
            }
        },
        None => None,
    };

    if let Some(category_id) = fields.as_ref().and_then(|f| f.category_id) {
        if state.repo.find_category(user_id, category_id).await?.is_none() {
            errors.0.push(FieldError::new("category", "Not a valid choice."));
        }
    }

    let Some(fields) = fields.filter(|_| errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };

    let image_path = match image {
        Some((name, data)) => Some(state.images.save(user_id, &name, &data).await?),
        None => None,
    };

    let draft = NoteDraft {
        title: fields.title,
        content: fields.content,
        category_id: fields.category_id,
        image_path: image_path.clone(),
    };
    let written = match existing {
        Some(note) => state.repo.update_note(user_id, note.id, &draft).await,
        None => state.repo.create_note(user_id, &draft).await,
    };

    if let Err(e) = written {
        if let Some(path) = &image_path {
            state.images.remove(path).await;
        }
        return Err(e);
    }

    if let (Some(note), Some(_)) = (existing, &image_path) {
        if let Some(previous) = &note.image_path {
            state.images.remove(previous).await;
        }
    }
    Ok(())
}

pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect> {
    let result = match read_submission(multipart).await {
        Ok(submission) => save_note(&state, user.id, None, submission).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            flash::push(&session, "Note created.").await?;
            Ok(Redirect::to(INDEX_URL))
        }
        Err(e) => redirect_with_flash(&session, e, "/create_edit_note").await,
    }
}

pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Redirect> {
    let note = match state.repo.get_note(user.id, id).await {
        Ok(note) => note,
        Err(e) => return redirect_with_flash(&session, e, INDEX_URL).await,
    };

    let result = match read_submission(multipart).await {
        Ok(submission) => save_note(&state, user.id, Some(&note), submission).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            flash::push(&session, "Note updated.").await?;
            Ok(Redirect::to(INDEX_URL))
        }
        Err(e) => redirect_with_flash(&session, e, &format!("/create_edit_note/{id}")).await,
    }
}

pub async fn delete(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Redirect> {
    match state.repo.delete_note(user.id, id).await {
        Ok(note) => {
            if let Some(path) = &note.image_path {
                state.images.remove(path).await;
            }
            flash::push(&session, "Note has been deleted.").await?;
            Ok(Redirect::to(INDEX_URL))
        }
        Err(e) => redirect_with_flash(&session, e, INDEX_URL).await,
    }
}
