//! In-memory record store - used when no database is configured and in tests.
//!
//! Mirrors the PostgreSQL schema: unique usernames, slugs and follow pairs,
//! posts cascade to their comments, deleting a group detaches its posts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use yatube_core::domain::{
    Comment, Follow, Group, GroupDraft, NewComment, NewPost, NewUser, Post, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, CommentRepository, FeedScope, FollowRepository, GroupRepository,
    PostRepository, UserRepository,
};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    posts: Table<Post>,
    groups: Table<Group>,
    comments: Table<Comment>,
    follows: Table<Follow>,
}

impl Tables {
    fn in_scope(&self, post: &Post, scope: FeedScope) -> bool {
        match scope {
            FeedScope::All => true,
            FeedScope::Group(group_id) => post.group_id == Some(group_id),
            FeedScope::Author(author_id) => post.author_id == author_id,
            FeedScope::FollowedBy(user_id) => self
                .follows
                .rows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }
}

/// Every table behind one async lock.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.rows.remove(&id).ok_or(RepoError::NotFound)?;

        let post_ids: Vec<i64> = tables
            .posts
            .rows
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.rows.retain(|_, p| p.author_id != id);
        tables
            .comments
            .rows
            .retain(|_, c| c.author_id != id && !post_ids.contains(&c.post_id));
        tables
            .follows
            .rows
            .retain(|_, f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.rows.get(id).cloned())
            .collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        let user = User {
            id: tables.users.next_id(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.rows.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.rows.remove(&id).ok_or(RepoError::NotFound)?;
        tables.comments.rows.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".to_string()));
        }
        if let Some(group_id) = post.group_id {
            if !tables.groups.rows.contains_key(&group_id) {
                return Err(RepoError::Constraint("post group does not exist".to_string()));
            }
        }

        let post = Post {
            id: tables.posts.next_id(),
            author_id: post.author_id,
            group_id: post.group_id,
            text: post.text,
            image: post.image,
            created_at: Utc::now(),
        };
        tables.posts.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.posts.rows.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        stored.text = post.text;
        stored.group_id = post.group_id;
        stored.image = post.image;
        Ok(stored.clone())
    }

    async fn count(&self, scope: FeedScope) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .rows
            .values()
            .filter(|p| tables.in_scope(p, scope))
            .count();
        Ok(count as u64)
    }

    async fn list(
        &self,
        scope: FeedScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .rows
            .values()
            .filter(|p| tables.in_scope(p, scope))
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.groups.rows.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.rows.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.rows.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.groups.rows.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.rows.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn create(&self, group: GroupDraft) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.rows.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "group slug '{}' already exists",
                group.slug
            )));
        }

        let group = Group {
            id: tables.groups.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.rows.insert(group.id, group.clone());
        Ok(group)
    }
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.rows.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.rows.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".to_string()));
        }

        let comment = Comment {
            id: tables.comments.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        tables.comments.rows.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        // BTreeMap iteration is id order, which is creation order.
        Ok(tables
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Follow, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Follow>, RepoError> {
        Ok(self.tables.read().await.follows.rows.get(&id).copied())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.follows.rows.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn find_pair(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .rows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .copied())
    }

    async fn create(&self, user_id: i64, author_id: i64) -> Result<Follow, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .follows
            .rows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Err(RepoError::Constraint("follow pair already exists".to_string()));
        }

        let follow = Follow {
            id: tables.follows.next_id(),
            user_id,
            author_id,
        };
        tables.follows.rows.insert(follow.id, follow);
        Ok(follow)
    }
}
