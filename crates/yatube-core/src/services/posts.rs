//! Post authoring, detail pages and comments.

use std::sync::Arc;

use yatube_shared::FormErrors;
use yatube_shared::dto::{CommentForm, PostForm};

use crate::domain::{CommentEntry, NewComment, Post, PostDraft, PostEntry};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    CommentRepository, FeedScope, GroupRepository, PostRepository, UserRepository,
};

use super::FeedService;

/// Whether the viewer may edit a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAccess {
    /// The viewer wrote the post.
    Author(Post),
    /// Someone else wrote it; nothing was changed.
    NotAuthor,
}

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub entry: PostEntry,
    pub comments: Vec<CommentEntry>,
    /// How many posts the author has written in total.
    pub author_posts: u64,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    comments: Arc<dyn CommentRepository>,
    feeds: FeedService,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        let feeds = FeedService::new(posts.clone(), users.clone(), groups.clone());
        Self {
            posts,
            users,
            groups,
            comments,
            feeds,
        }
    }

    /// Validate `form` and store it as a new post by `author_id`.
    pub async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, DomainError> {
        let draft = self.clean(form).await?;
        let post = self.posts.create(draft.into_new_post(author_id)).await?;
        tracing::info!(post_id = post.id, author_id, "Post created");
        Ok(post)
    }

    /// Check whether `editor_id` may edit `post_id`.
    pub async fn edit_access(&self, editor_id: i64, post_id: i64) -> Result<EditAccess, DomainError> {
        let post = self.get(post_id).await?;
        if post.author_id != editor_id {
            return Ok(EditAccess::NotAuthor);
        }
        Ok(EditAccess::Author(post))
    }

    /// Apply `form` to `post_id` when `editor_id` is its author.
    pub async fn edit(
        &self,
        editor_id: i64,
        post_id: i64,
        form: &PostForm,
    ) -> Result<EditAccess, DomainError> {
        let mut post = match self.edit_access(editor_id, post_id).await? {
            EditAccess::Author(post) => post,
            EditAccess::NotAuthor => {
                tracing::warn!(post_id, editor_id, "Edit attempt by non-author");
                return Ok(EditAccess::NotAuthor);
            }
        };

        let draft = self.clean(form).await?;
        post.text = draft.text;
        post.group_id = draft.group_id;
        post.image = draft.image;

        let updated = self.posts.update(post).await?;
        tracing::info!(post_id, "Post updated");
        Ok(EditAccess::Author(updated))
    }

    /// Administrative removal.
    pub async fn delete(&self, post_id: i64) -> Result<(), DomainError> {
        self.posts.delete(post_id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("post", post_id),
            other => other.into(),
        })?;
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    pub async fn detail(&self, post_id: i64) -> Result<PostDetail, DomainError> {
        let post = self.get(post_id).await?;
        let author_posts = self.posts.count(FeedScope::Author(post.author_id)).await?;

        let entry = self
            .feeds
            .resolve(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("post vanished while resolving".to_string()))?;

        let comments = self.comments.list_for_post(post_id).await?;
        let mut author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = if author_ids.is_empty() {
            Vec::new()
        } else {
            self.users.find_by_ids(&author_ids).await?
        };

        let comments = comments
            .into_iter()
            .map(|comment| {
                let author = authors
                    .iter()
                    .find(|u| u.id == comment.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                CommentEntry { comment, author }
            })
            .collect();

        Ok(PostDetail {
            entry,
            comments,
            author_posts,
        })
    }

    /// Leave a comment under `post_id`.
    pub async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        form: &CommentForm,
    ) -> Result<(), DomainError> {
        self.get(post_id).await?;

        let text = form.text.trim();
        if text.is_empty() {
            let mut errors = FormErrors::new();
            errors.add("text", "This field is required.");
            return Err(DomainError::Validation(errors));
        }

        let comment = self
            .comments
            .create(NewComment {
                post_id,
                author_id,
                text: text.to_string(),
            })
            .await?;
        tracing::info!(comment_id = comment.id, post_id, author_id, "Comment added");
        Ok(())
    }

    async fn get(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// Form validation plus the group existence check.
    async fn clean(&self, form: &PostForm) -> Result<PostDraft, DomainError> {
        let draft = PostDraft::from_form(form).map_err(DomainError::Validation)?;

        if let Some(group_id) = draft.group_id {
            if self.groups.find_by_id(group_id).await?.is_none() {
                let mut errors = FormErrors::new();
                errors.add(
                    "group",
                    "Select a valid choice. That choice is not one of the available choices.",
                );
                return Err(DomainError::Validation(errors));
            }
        }

        Ok(draft)
    }
}
