use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - a reply left under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A comment that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

/// A comment with its author's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: String,
}
