//! Paginated post listings.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Group, Post, PostEntry, User};
use crate::error::DomainError;
use crate::pagination::{PAGE_SIZE, Page, PageRequest, Paginator};
use crate::ports::{FeedScope, GroupRepository, PostRepository, UserRepository};

/// Builds pages of posts for every listing scope.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
    ) -> Self {
        Self {
            posts,
            users,
            groups,
        }
    }

    /// One page of `scope`, newest first.
    pub async fn page(
        &self,
        scope: FeedScope,
        request: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        let total = self.posts.count(scope).await?;
        let paginator = Paginator::new(total, PAGE_SIZE);
        let (offset, limit) = paginator.window(request);

        let posts = self.posts.list(scope, offset, limit).await?;
        let entries = self.resolve(posts).await?;

        tracing::debug!(
            ?scope,
            total,
            page = paginator.clamp(request),
            "Built feed page"
        );
        Ok(paginator.page(request, entries))
    }

    pub async fn global(&self, request: PageRequest) -> Result<Page<PostEntry>, DomainError> {
        self.page(FeedScope::All, request).await
    }

    /// The group behind `slug` and one page of its posts.
    pub async fn group(
        &self,
        slug: &str,
        request: PageRequest,
    ) -> Result<(Group, Page<PostEntry>), DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;
        let page = self.page(FeedScope::Group(group.id), request).await?;
        Ok((group, page))
    }

    /// The user behind `username` and one page of their posts.
    pub async fn author(
        &self,
        username: &str,
        request: PageRequest,
    ) -> Result<(User, Page<PostEntry>), DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;
        let page = self.page(FeedScope::Author(author.id), request).await?;
        Ok((author, page))
    }

    /// Posts by everyone `user_id` follows.
    pub async fn followed_by(
        &self,
        user_id: i64,
        request: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        self.page(FeedScope::FollowedBy(user_id), request).await
    }

    /// Attach author usernames and groups to `posts`, keeping their order.
    pub async fn resolve(&self, posts: Vec<Post>) -> Result<Vec<PostEntry>, DomainError> {
        let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut group_ids: Vec<i64> = posts.iter().filter_map(|p| p.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let authors: HashMap<i64, String> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_by_ids(&author_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect()
        };

        let groups: HashMap<i64, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.groups
                .find_by_ids(&group_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned().unwrap_or_else(|| {
                    tracing::warn!(post_id = post.id, author_id = post.author_id, "Post author missing");
                    String::new()
                });
                let group = post
                    .group_id
                    .and_then(|id| groups.get(&id))
                    .map(Group::to_ref);
                PostEntry {
                    post,
                    author,
                    group,
                }
            })
            .collect())
    }
}
