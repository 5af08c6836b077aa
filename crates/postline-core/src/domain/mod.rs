//! Domain entities - the core business objects.

mod comment;
mod key;
mod post;
mod user;

pub use comment::Comment;
pub use key::{Key, KeyError};
pub use post::Post;
pub use user::{CurrentUser, User};
