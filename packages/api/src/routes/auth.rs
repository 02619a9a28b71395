//! Login, registration and logout.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use store::forms::{LoginForm, RegistrationForm};
use store::{FieldError, ValidationErrors};
use tower_sessions::Session;

use super::{redirect_with_flash, FormPage, INDEX_URL};
use crate::auth::{self, current_user_id};
use crate::error::{login_url, AppError, Result};
use crate::flash;
use crate::models::User;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths that fit in a `Location` header are
/// followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains("://")
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => INDEX_URL,
    }
}

pub async fn login_page(session: Session) -> Result<Response> {
    if current_user_id(&session).await?.is_some() {
        return Ok(Redirect::to(INDEX_URL).into_response());
    }
    let flashes = flash::take(&session).await?;
    Ok(Json(FormPage {
        title: "Sign In",
        flashes,
    })
    .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    if current_user_id(&session).await?.is_some() {
        return Ok(Redirect::to(INDEX_URL));
    }
    let next = safe_next(query.next.as_deref()).to_string();

    match authenticate(&state, &form).await {
        Ok((user, remember)) => {
            let remember_for =
                remember.then(|| time::Duration::days(i64::from(state.config.session.remember_days)));
            auth::log_in(&session, user.id, remember_for).await?;
            tracing::info!("User {} logged in", user.id);
            Ok(Redirect::to(&next))
        }
        Err(e) => redirect_with_flash(&session, e, &login_url(&next)).await,
    }
}

async fn authenticate(state: &AppState, form: &LoginForm) -> Result<(User, bool)> {
    let credentials = form.validate()?;
    let user = state
        .repo
        .find_user_by_username(&credentials.username)
        .await?
        .filter(|user| auth::verify_password(&credentials.password, &user.password_hash))
        .ok_or(AppError::InvalidCredentials)?;
    Ok((user, credentials.remember))
}

pub async fn register_page(session: Session) -> Result<Response> {
    if current_user_id(&session).await?.is_some() {
        return Ok(Redirect::to(INDEX_URL).into_response());
    }
    let flashes = flash::take(&session).await?;
    Ok(Json(FormPage {
        title: "Register",
        flashes,
    })
    .into_response())
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegistrationForm>,
) -> Result<Redirect> {
    if current_user_id(&session).await?.is_some() {
        return Ok(Redirect::to(INDEX_URL));
    }

    match register_user(&state, &form).await {
        Ok(user) => {
            tracing::info!("Registered user {} ({})", user.id, user.username);
            flash::push(&session, "Congratulations, you are now a registered user!").await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => redirect_with_flash(&session, e, "/register").await,
    }
}

async fn register_user(state: &AppState, form: &RegistrationForm) -> Result<User> {
    let registration = form.validate()?;

    let mut errors = ValidationErrors::default();
    if state.repo.username_taken(&registration.username).await? {
        errors
            .0
            .push(FieldError::new("username", "Please use a different username."));
    }
    if state.repo.email_taken(&registration.email).await? {
        errors
            .0
            .push(FieldError::new("email", "Please use a different email address."));
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let password_hash = auth::hash_password(&registration.password)?;
    state
        .repo
        .create_user(&registration.username, &registration.email, &password_hash)
        .await
}

pub async fn logout(session: Session) -> Result<Redirect> {
    auth::log_out(&session).await?;
    Ok(Redirect::to(INDEX_URL))
}
