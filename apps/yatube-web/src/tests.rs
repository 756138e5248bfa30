//! End-to-end tests through the full route table, backed by the in-memory store.

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use std::sync::Arc;
use std::time::Duration;

use yatube_core::domain::{Group, Post, User};
use yatube_infra::ManualClock;
use yatube_shared::dto::{GroupForm, PostForm, SignupForm};

use crate::handlers;
use crate::middleware::auth::SESSION_COOKIE;
use crate::observability::{REQUEST_ID_HEADER, RequestIdMiddleware};
use crate::state::AppState;

const PASSWORD: &str = "correct-horse-1";

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($state.tokens.clone()))
                .configure(handlers::configure_routes)
                .default_service(web::to(handlers::not_found)),
        )
        .await
    };
}

fn state_with_clock(admins: &[&str]) -> (AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (AppState::for_tests(clock.clone(), admins), clock)
}

async fn user(state: &AppState, username: &str) -> User {
    state
        .accounts
        .register(&SignupForm {
            username: username.to_string(),
            password1: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
            ..SignupForm::default()
        })
        .await
        .unwrap()
}

async fn group(state: &AppState, slug: &str, title: &str) -> Group {
    state
        .groups
        .create(&GroupForm {
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("All about {title}"),
        })
        .await
        .unwrap()
}

async fn post(state: &AppState, author: &User, text: &str, group: Option<&Group>) -> Post {
    state
        .posts
        .create(
            author.id,
            &PostForm {
                text: text.to_string(),
                group: group.map(|g| g.id.to_string()).unwrap_or_default(),
                image: String::new(),
            },
        )
        .await
        .unwrap()
}

fn session(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, state.roles_for(&user.username))
        .unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn cards(body: &str) -> usize {
    body.matches("class=\"post-card\"").count()
}

#[actix_web::test]
async fn test_public_pages_render_their_titles() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let cats = group(&state, "cats", "Cats").await;
    let first = post(&state, &leo, "Hello from the cat group", Some(&cats)).await;
    let app = init_app!(state);

    let pages = [
        ("/".to_string(), "Latest updates on the site"),
        ("/group/cats/".to_string(), "Posts of the group Cats"),
        ("/profile/leo/".to_string(), "Profile of leo"),
        (format!("/posts/{}/", first.id), "Post Hello from the cat group"),
        ("/about/author/".to_string(), "About the author"),
        ("/about/tech/".to_string(), "Technologies"),
        ("/auth/signup/".to_string(), "Sign up"),
        ("/auth/login/".to_string(), "Log in"),
    ];

    for (uri, title) in pages {
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert!(body.contains(title), "{uri} should mention '{title}'");
    }
}

#[actix_web::test]
async fn test_private_pages_render_for_logged_in_users() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let mine = post(&state, &leo, "Editable", None).await;
    let cookie = session(&state, &leo);
    let app = init_app!(state);

    let pages = [
        ("/create/".to_string(), "New post"),
        ("/follow/".to_string(), "Posts of the authors you follow"),
        (format!("/posts/{}/edit/", mine.id), "Edit post"),
    ];

    for (uri, title) in pages {
        let req = test::TestRequest::get().uri(&uri).cookie(cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert!(body.contains(title), "{uri} should mention '{title}'");
    }
}

#[actix_web::test]
async fn test_unknown_paths_render_not_found_page() {
    let (state, _clock) = state_with_clock(&[]);
    let app = init_app!(state);

    for uri in [
        "/unexisting_page/",
        "/users/login/",
        "/group/nope/",
        "/profile/ghost/",
        "/posts/999/",
        "/posts/abc/",
    ] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert!(body.contains("Page not found"), "{uri}");
    }
}

#[actix_web::test]
async fn test_anonymous_visitors_are_sent_to_login() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let theirs = post(&state, &leo, "Some text", None).await;
    let app = init_app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=%2Fcreate%2F");

    let edit = format!("/posts/{}/edit/", theirs.id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&edit).to_request()).await;
    assert_eq!(
        location(&res),
        format!("/auth/login/?next=%2Fposts%2F{}%2Fedit%2F", theirs.id)
    );

    let res = test::call_service(&app, test::TestRequest::get().uri("/follow/").to_request()).await;
    assert_eq!(location(&res), "/auth/login/?next=%2Ffollow%2F");
}

#[actix_web::test]
async fn test_feeds_paginate_by_ten() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let cats = group(&state, "cats", "Cats").await;
    for i in 0..13 {
        post(&state, &leo, &format!("Post number {i}"), Some(&cats)).await;
    }
    let app = init_app!(state);

    for base in ["/", "/group/cats/", "/profile/leo/"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(base).to_request()).await;
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert_eq!(cards(&body), 10, "{base}");
        assert!(body.contains("Page 1 of 2"), "{base}");

        let uri = format!("{base}?page=2");
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert_eq!(cards(&body), 3, "{uri}");
    }

    let res = test::call_service(&app, test::TestRequest::get().uri("/?page=99").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert_eq!(cards(&body), 3);

    let res = test::call_service(&app, test::TestRequest::get().uri("/?page=abc").to_request()).await;
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert_eq!(cards(&body), 10);
    assert!(body.contains("Post number 12"));
}

#[actix_web::test]
async fn test_global_feed_is_cached_for_twenty_seconds() {
    let (state, clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let doomed = post(&state, &leo, "Soon to be gone", None).await;
    let app = init_app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let before = test::read_body(res).await;
    assert!(String::from_utf8_lossy(&before).contains("Soon to be gone"));

    state.posts.delete(doomed.id).await.unwrap();

    clock.advance(Duration::from_secs(19));
    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let cached = test::read_body(res).await;
    assert_eq!(before, cached);

    clock.advance(Duration::from_secs(1));
    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let fresh = test::read_body(res).await;
    assert_ne!(before, fresh);
    assert!(!String::from_utf8_lossy(&fresh).contains("Soon to be gone"));
}

#[actix_web::test]
async fn test_follow_unfollow_round() {
    let (state, _clock) = state_with_clock(&[]);
    let reader = user(&state, "reader").await;
    let writer = user(&state, "writer").await;
    let stranger = user(&state, "stranger").await;
    post(&state, &writer, "Worth following", None).await;
    let app = init_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/profile/writer/follow/")
            .cookie(session(&state, &reader))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/profile/writer/");
    }
    assert!(state.follows.is_following(reader.id, writer.id).await.unwrap());

    let req = test::TestRequest::get().uri("/follow/").cookie(session(&state, &reader)).to_request();
    let body = String::from_utf8(test::read_body(test::call_service(&app, req).await).await.to_vec())
        .unwrap();
    assert!(body.contains("Worth following"));

    let req = test::TestRequest::get().uri("/follow/").cookie(session(&state, &stranger)).to_request();
    let body = String::from_utf8(test::read_body(test::call_service(&app, req).await).await.to_vec())
        .unwrap();
    assert_eq!(cards(&body), 0);

    let req = test::TestRequest::get()
        .uri("/profile/writer/unfollow/")
        .cookie(session(&state, &reader))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    assert!(!state.follows.is_following(reader.id, writer.id).await.unwrap());

    let req = test::TestRequest::get()
        .uri("/profile/writer/unfollow/")
        .cookie(session(&state, &reader))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_self_follow_is_ignored() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/leo/follow/")
        .cookie(session(&state, &leo))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/profile/leo/");
    assert!(!state.follows.is_following(leo.id, leo.id).await.unwrap());

    let req = test::TestRequest::get()
        .uri("/profile/ghost/follow/")
        .cookie(session(&state, &leo))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_post_stores_group_and_image() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let cats = group(&state, "cats", "Cats").await;
    let group_id = cats.id.to_string();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &leo))
        .set_form([
            ("text", "A brand new post"),
            ("group", group_id.as_str()),
            ("image", "posts/small.gif"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/leo/");

    let (_, page) = state
        .feeds
        .group("cats", yatube_core::PageRequest::new(1))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    let entry = &page.items[0];
    assert_eq!(entry.post.text, "A brand new post");
    assert_eq!(entry.post.image.as_deref(), Some("posts/small.gif"));
}

#[actix_web::test]
async fn test_invalid_post_form_is_shown_again() {
    let (state, _clock) = state_with_clock(&[]);
    let leo = user(&state, "leo").await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &leo))
        .set_form([("text", "   "), ("group", ""), ("image", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(body.contains("This field is required."));

    let (_, page) = state
        .feeds
        .author("leo", yatube_core::PageRequest::new(1))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[actix_web::test]
async fn test_only_the_author_can_edit() {
    let (state, _clock) = state_with_clock(&[]);
    let author = user(&state, "HasNoName").await;
    let other = user(&state, "NoName").await;
    let original = post(&state, &author, "Original text", None).await;
    let app = init_app!(state);
    let edit = format!("/posts/{}/edit/", original.id);

    let req = test::TestRequest::get().uri(&edit).cookie(session(&state, &other)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/profile/NoName/");

    let req = test::TestRequest::post()
        .uri(&edit)
        .cookie(session(&state, &other))
        .set_form([("text", "Hijacked"), ("group", ""), ("image", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/profile/NoName/");
    let detail = state.posts.detail(original.id).await.unwrap();
    assert_eq!(detail.entry.post.text, "Original text");

    let req = test::TestRequest::post()
        .uri(&edit)
        .cookie(session(&state, &author))
        .set_form([("text", "Edited text"), ("group", ""), ("image", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", original.id));
    let detail = state.posts.detail(original.id).await.unwrap();
    assert_eq!(detail.entry.post.text, "Edited text");
    assert_eq!(detail.entry.post.created_at, original.created_at);
}

#[actix_web::test]
async fn test_comment_appears_on_post_page() {
    let (state, _clock) = state_with_clock(&[]);
    let author = user(&state, "author").await;
    let reader = user(&state, "reader").await;
    let target = post(&state, &author, "Comment on me", None).await;
    let app = init_app!(state);
    let detail = format!("/posts/{}/", target.id);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", target.id))
        .cookie(session(&state, &reader))
        .set_form([("text", "Nice post!")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), detail);

    let res = test::call_service(&app, test::TestRequest::get().uri(&detail).to_request()).await;
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(body.contains("Nice post!"));
    assert!(!body.contains("Add a comment"));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", target.id))
        .set_form([("text", "Anonymous")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(location(&res).starts_with("/auth/login/"));
    assert_eq!(state.posts.detail(target.id).await.unwrap().comments.len(), 1);
}

#[actix_web::test]
async fn test_signup_login_logout() {
    let (state, _clock) = state_with_clock(&[]);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("first_name", "Leo"),
            ("last_name", "Tolstoy"),
            ("username", "leo"),
            ("email", "leo@example.com"),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(res.response().cookies().any(|c| c.name() == SESSION_COOKIE));

    let req = test::TestRequest::post()
        .uri("/auth/login/?next=/follow/")
        .set_form([("username", "leo"), ("password", "wrong-password")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(body.contains("Please enter a correct username and password"));

    let req = test::TestRequest::post()
        .uri("/auth/login/?next=/follow/")
        .set_form([("username", "leo"), ("password", PASSWORD)])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/follow/");
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .unwrap();

    let req = test::TestRequest::get().uri("/follow/").cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for next in ["/%5Cevil.example/", "//evil.example/", "/%0D%0Aevil"] {
        let req = test::TestRequest::post()
            .uri(&format!("/auth/login/?next={next}"))
            .set_form([("username", "leo"), ("password", PASSWORD)])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{next}");
        assert_eq!(location(&res), "/", "{next}");
    }

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/logout/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let removal = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string());
    assert_eq!(removal.as_deref(), Some(""));
}

#[actix_web::test]
async fn test_signup_rejects_taken_username() {
    let (state, _clock) = state_with_clock(&[]);
    user(&state, "leo").await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "leo"),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(body.contains("A user with that username already exists."));
}

#[actix_web::test]
async fn test_admin_area_requires_admin_role() {
    let (state, _clock) = state_with_clock(&["boss"]);
    let boss = user(&state, "boss").await;
    let leo = user(&state, "leo").await;
    let victim = post(&state, &leo, "Spam", None).await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/admin/groups/").cookie(session(&state, &leo)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(body.contains("Access denied"));

    let req = test::TestRequest::get().uri("/admin/groups/").cookie(session(&state, &boss)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .cookie(session(&state, &boss))
        .set_form([("title", "Dogs"), ("slug", "dogs"), ("description", "Woof")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/admin/groups/");
    assert_eq!(state.groups.list().await.unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/admin/groups/")
        .cookie(session(&state, &boss))
        .set_form([("title", "Dogs again"), ("slug", "dogs"), ("description", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(body.contains("Group with this slug already exists."));

    let delete = format!("/admin/posts/{}/delete/", victim.id);
    let req = test::TestRequest::post().uri(&delete).cookie(session(&state, &leo)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post().uri(&delete).cookie(session(&state, &boss)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/");
    assert!(state.posts.detail(victim.id).await.is_err());
}

#[actix_web::test]
async fn test_health_reports_backends() {
    let (state, _clock) = state_with_clock(&[]);
    let app = init_app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(REQUEST_ID_HEADER));

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["cache"], "memory");
}
