//! Category create, rename and delete.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use store::forms::CategoryForm;
use tower_sessions::Session;

use super::{redirect_with_flash, CategoryPage, FormPage, INDEX_URL};
use crate::auth::CurrentUser;
use crate::error::Result;
use crate::flash;
use crate::AppState;

pub async fn create_page(_user: CurrentUser, session: Session) -> Result<Json<FormPage>> {
    Ok(Json(FormPage {
        title: "Create Category",
        flashes: flash::take(&session).await?,
    }))
}

pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let name = match form.validate() {
        Ok(name) => name,
        Err(e) => return redirect_with_flash(&session, e.into(), "/create_category").await,
    };

    state.repo.create_category(user.id, &name).await?;
    flash::push(&session, "Category created.").await?;
    Ok(Redirect::to(INDEX_URL))
}

pub async fn edit_page(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response> {
    let category = match state.repo.get_category(user.id, id).await {
        Ok(category) => category,
        Err(e) => return Ok(redirect_with_flash(&session, e, INDEX_URL).await?.into_response()),
    };

    Ok(Json(CategoryPage {
        title: "Edit Category",
        category: category.to_info(),
        flashes: flash::take(&session).await?,
    })
    .into_response())
}

pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let back_to = format!("/edit_category/{id}");

    // Ownership first, so a foreign id never reveals validation details.
    if let Err(e) = state.repo.get_category(user.id, id).await {
        return redirect_with_flash(&session, e, &back_to).await;
    }

    let result = match form.validate() {
        Ok(name) => state.repo.rename_category(user.id, id, &name).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(_) => {
            flash::push(&session, "Category updated successfully.").await?;
            Ok(Redirect::to(INDEX_URL))
        }
        Err(e) => redirect_with_flash(&session, e, &back_to).await,
    }
}

pub async fn delete(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Redirect> {
    match state.repo.delete_category(user.id, id).await {
        Ok(()) => {
            flash::push(&session, "Category deleted.").await?;
            Ok(Redirect::to(INDEX_URL))
        }
        Err(e) => redirect_with_flash(&session, e, INDEX_URL).await,
    }
}
