//! Database rows and their projections into `store` view models.

mod category;
mod note;
mod user;

pub use category::Category;
pub use note::Note;
pub use user::User;
