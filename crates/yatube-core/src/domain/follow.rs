use serde::{Deserialize, Serialize};

/// Follow entity - `user_id` subscribes to posts written by `author_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}
