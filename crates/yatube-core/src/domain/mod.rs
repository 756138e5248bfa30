//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentEntry, NewComment};
pub use follow::Follow;
pub use group::{Group, GroupDraft, GroupRef};
pub use post::{IMAGE_EXTENSIONS, NewPost, Post, PostDraft, PostEntry};
pub use user::{NewUser, User};
