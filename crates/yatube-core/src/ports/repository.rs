use async_trait::async_trait;

use crate::domain::{
    Comment, Follow, Group, GroupDraft, NewComment, NewPost, NewUser, Post, User,
};
use crate::error::RepoError;

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post.
    All,
    /// Posts filed under a group.
    Group(i64),
    /// Posts written by a user.
    Author(i64),
    /// Posts written by anyone the user follows.
    FollowedBy(i64),
}

/// Generic repository trait shared by every record type.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` when nothing matched.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError>;

    /// Store a new user. `RepoError::Constraint` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Post repository. Listings are ordered newest first, ties by id descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite text, group and image of an existing post.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn count(&self, scope: FeedScope) -> Result<u64, RepoError>;

    async fn list(&self, scope: FeedScope, offset: u64, limit: u64)
    -> Result<Vec<Post>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError>;

    /// Every group, ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;

    /// Store a new group. `RepoError::Constraint` when the slug is taken.
    async fn create(&self, group: GroupDraft) -> Result<Group, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

/// Follow repository.
#[async_trait]
pub trait FollowRepository: BaseRepository<Follow, i64> {
    async fn find_pair(&self, user_id: i64, author_id: i64)
    -> Result<Option<Follow>, RepoError>;

    /// Store a new pair. `RepoError::Constraint` when it already exists.
    async fn create(&self, user_id: i64, author_id: i64) -> Result<Follow, RepoError>;
}
