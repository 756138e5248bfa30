use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

use yatube_core::domain::{NewPost, Post};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, FeedScope, FollowRepository, PostRepository};

use crate::database::entity::follow;
use crate::database::entity::post;
use crate::database::postgres_repo::{
    PostgresFollowRepository, PostgresPostRepository, scoped_posts,
};

fn post_model(id: i64, text: &str) -> post::Model {
    post::Model {
        id,
        author_id: 1,
        group_id: Some(2),
        text: text.to_owned(),
        image: None,
        created_at: Utc::now().into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(7, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(7).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.text, "Test Post");
    assert_eq!(post.id, 7);
    assert_eq!(post.group_id, Some(2));
}

#[tokio::test]
async fn test_list_returns_page_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(12, "b"), post_model(11, "a")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo.list(FeedScope::Group(2), 10, 10).await.unwrap();
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![12, 11]);
}

#[test]
fn test_scoped_post_queries() {
    let sql = |scope| {
        scoped_posts(scope)
            .build(DatabaseBackend::Postgres)
            .to_string()
    };

    assert!(!sql(FeedScope::All).contains("WHERE"));
    assert!(sql(FeedScope::Group(2)).contains(r#""posts"."group_id" = 2"#));
    assert!(sql(FeedScope::Author(4)).contains(r#""posts"."author_id" = 4"#));

    let followed = sql(FeedScope::FollowedBy(3));
    assert!(followed.contains(r#""posts"."author_id" IN (SELECT"#), "{followed}");
    assert!(followed.contains(r#"FROM "follows""#), "{followed}");
}

#[tokio::test]
async fn test_create_post_returns_stored_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(1, "Hello World")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = PostRepository::create(
        &repo,
        NewPost {
            author_id: 1,
            group_id: Some(2),
            text: "Hello World".to_owned(),
            image: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(post.id, 1);
    assert_eq!(post.text, "Hello World");
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, i64>::delete(&repo, 99).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_follow_pair() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![follow::Model {
            id: 5,
            user_id: 1,
            author_id: 2,
        }]])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);
    let pair = repo.find_pair(1, 2).await.unwrap().unwrap();
    assert_eq!((pair.user_id, pair.author_id), (1, 2));
}
