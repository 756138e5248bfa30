//! Subscriptions between users.

use std::sync::Arc;

use crate::domain::User;
use crate::error::{DomainError, RepoError};
use crate::ports::{FollowRepository, UserRepository};

/// Result of a subscribe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    /// Following yourself is ignored.
    SelfFollow,
}

#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { follows, users }
    }

    /// Subscribe `user_id` to `author_username`. Repeating it is harmless.
    pub async fn follow(
        &self,
        user_id: i64,
        author_username: &str,
    ) -> Result<FollowOutcome, DomainError> {
        let author = self.author(author_username).await?;
        if author.id == user_id {
            tracing::debug!(user_id, "Ignoring self-follow");
            return Ok(FollowOutcome::SelfFollow);
        }

        if self.follows.find_pair(user_id, author.id).await?.is_some() {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        match self.follows.create(user_id, author.id).await {
            Ok(follow) => {
                tracing::info!(follow_id = follow.id, user_id, author_id = author.id, "Followed");
                Ok(FollowOutcome::Followed)
            }
            // Lost a race against a concurrent subscribe.
            Err(RepoError::Constraint(_)) => Ok(FollowOutcome::AlreadyFollowing),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the subscription of `user_id` to `author_username`.
    pub async fn unfollow(&self, user_id: i64, author_username: &str) -> Result<(), DomainError> {
        let author = self.author(author_username).await?;
        let follow = self
            .follows
            .find_pair(user_id, author.id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("follow", format!("{} -> {}", user_id, author.id))
            })?;

        self.follows.delete(follow.id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("follow", follow.id),
            other => other.into(),
        })?;
        tracing::info!(user_id, author_id = author.id, "Unfollowed");
        Ok(())
    }

    pub async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        Ok(self.follows.find_pair(user_id, author_id).await?.is_some())
    }

    async fn author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }
}
