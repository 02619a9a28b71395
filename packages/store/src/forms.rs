//! # Form inputs and field validators
//!
//! Each form posted by the web front end has a raw input struct (deserialized
//! straight from the request body, every field defaulted so a missing field is
//! reported as a validation error rather than a decode failure) and a
//! `validate` method that returns either the cleaned values or every field
//! error at once.
//!
//! The validators themselves ([`required`], [`length`], [`email`],
//! [`equal_to`], [`choice`]) are plain functions returning a [`FieldError`], so
//! the server can also use them for checks that need the database.

use serde::Deserialize;
use thiserror::Error;

pub const USERNAME_MAX: usize = 64;
pub const EMAIL_MAX: usize = 120;
pub const CATEGORY_NAME_MAX: usize = 64;
pub const TITLE_MAX: usize = 64;
pub const CONTENT_MIN: usize = 1;
pub const CONTENT_MAX: usize = 1000;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field error found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.message.clone()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.0.push(e);
                None
            }
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Value must contain something other than whitespace.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FieldError::new(field, "This field is required."))
    } else {
        Ok(trimmed)
    }
}

/// Character count must be within `min..=max`.
pub fn length(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), FieldError> {
    let count = value.chars().count();
    if count < min || count > max {
        Err(FieldError::new(
            field,
            format!("Field must be between {min} and {max} characters long."),
        ))
    } else {
        Ok(())
    }
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain.
pub fn email(field: &'static str, value: &str) -> Result<(), FieldError> {
    let invalid = || FieldError::new(field, "Invalid email address.");
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

pub fn equal_to(field: &'static str, value: &str, other_name: &str, other: &str) -> Result<(), FieldError> {
    if value == other {
        Ok(())
    } else {
        Err(FieldError::new(field, format!("Field must be equal to {other_name}.")))
    }
}

/// Parse an optional select value. Empty and `0` mean "no selection".
pub fn choice(field: &'static str, value: Option<&str>) -> Result<Option<i64>, FieldError> {
    match value.map(str::trim) {
        None | Some("") | Some("0") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(FieldError::new(field, "Not a valid choice.")),
        },
    }
}

/// Checkbox values as browsers and form libraries send them.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes" | "on" | "true" | "1")
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember_me: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub remember: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let username = errors.check(required("username", &self.username));
        // Passwords are compared verbatim, only emptiness is checked.
        let password = errors.check(required("password", &self.password).map(|_| self.password.as_str()));
        errors.finish(|| Credentials {
            username: username.unwrap_or_default().to_string(),
            password: password.unwrap_or_default().to_string(),
            remember: checkbox(self.remember_me.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub username: String,
    /// Lowercased.
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let username = errors
            .check(required("username", &self.username))
            .and_then(|u| errors.check(length("username", u, 1, USERNAME_MAX)).map(|_| u));

        let email_addr = errors.check(required("email", &self.email)).map(str::to_lowercase);
        if let Some(addr) = &email_addr {
            errors.check(email("email", addr));
            errors.check(length("email", addr, 1, EMAIL_MAX));
        }

        let password = errors.check(required("password", &self.password).map(|_| self.password.as_str()));
        if errors.check(required("password2", &self.password2)).is_some() {
            errors.check(equal_to("password2", &self.password2, "password", &self.password));
        }

        errors.finish(|| Registration {
            username: username.unwrap_or_default().to_string(),
            email: email_addr.unwrap_or_default(),
            password: password.unwrap_or_default().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors
            .check(required("name", &self.name))
            .and_then(|n| errors.check(length("name", n, 1, CATEGORY_NAME_MAX)).map(|_| n));
        errors.finish(|| name.unwrap_or_default().to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search: String,
}

impl SearchForm {
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        required("search", &self.search)
            .map(str::to_string)
            .map_err(|e| ValidationErrors(vec![e]))
    }
}

/// Text fields of the note form. The image travels separately as a file part.
#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
}

impl NoteForm {
    pub fn validate(&self) -> Result<NoteFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = errors
            .check(required("title", &self.title))
            .and_then(|t| errors.check(length("title", t, 1, TITLE_MAX)).map(|_| t));

        let content = errors
            .check(required("content", &self.content).map(|_| self.content.as_str()))
            .and_then(|c| errors.check(length("content", c, CONTENT_MIN, CONTENT_MAX)).map(|_| c));

        let category_id = errors.check(choice("category", self.category.as_deref()));

        errors.finish(|| NoteFields {
            title: title.unwrap_or_default().to_string(),
            content: content.unwrap_or_default().to_string(),
            category_id: category_id.flatten(),
        })
    }
}
