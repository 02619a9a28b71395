//! # Store crate: domain types shared by the Jotter server and its tests
//!
//! Nothing here touches the database or the network; the `api` crate owns
//! persistence and HTTP.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | `jotter.toml` application config with environment overrides |
//! | [`forms`] | Raw form inputs and the field validators that clean them |
//! | [`models`] | Client-safe view models (`UserInfo`, `CategoryInfo`, `NoteInfo`) |
//! | [`uploads`] | Image extension allow-list, filename sanitizing, per-user upload paths |

pub mod config;
pub mod forms;
pub mod models;
pub mod uploads;

pub use config::AppConfig;
pub use forms::{FieldError, ValidationErrors};
pub use models::{CategoryInfo, NoteInfo, UserInfo};
