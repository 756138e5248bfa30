//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, Unchanged,
};

use yatube_core::domain::{
    Comment, Follow, Group, GroupDraft, NewComment, NewPost, NewUser, Post, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    CommentRepository, FeedScope, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(new.username),
            email: Set(new.email),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            password_hash: Set(new.password_hash),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into())
    }
}

/// Posts visible in a listing scope. The whole feed carries no `WHERE`.
pub(crate) fn scoped_posts(scope: FeedScope) -> Select<PostEntity> {
    let condition = match scope {
        FeedScope::All => return PostEntity::find(),
        FeedScope::Group(group_id) => post::Column::GroupId.eq(group_id),
        FeedScope::Author(author_id) => post::Column::AuthorId.eq(author_id),
        FeedScope::FollowedBy(user_id) => post::Column::AuthorId.in_subquery(
            Query::select()
                .column(follow::Column::AuthorId)
                .from(FollowEntity)
                .and_where(follow::Column::UserId.eq(user_id))
                .to_owned(),
        ),
    };
    PostEntity::find().filter(condition)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            author_id: Set(new.author_id),
            group_id: Set(new.group_id),
            text: Set(new.text),
            image: Set(new.image),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: Unchanged(post.id),
            group_id: Set(post.group_id),
            text: Set(post.text),
            image: Set(post.image),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into())
    }

    async fn count(&self, scope: FeedScope) -> Result<u64, RepoError> {
        scoped_posts(scope)
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn list(
        &self,
        scope: FeedScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let result = scoped_posts(scope)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: GroupDraft) -> Result<Group, RepoError> {
        let model = group::ActiveModel {
            title: Set(draft.title),
            slug: Set(draft.slug),
            description: Set(draft.description),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            post_id: Set(new.post_id),
            author_id: Set(new.author_id),
            text: Set(new.text),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn find_pair(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user_id: i64, author_id: i64) -> Result<Follow, RepoError> {
        let model = follow::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into())
    }
}
