//! Feeds, post pages, comments and follows.

use actix_web::{HttpResponse, http::StatusCode, web};

use yatube_core::PageRequest;
use yatube_core::error::DomainError;
use yatube_core::services::EditAccess;
use yatube_shared::FormErrors;
use yatube_shared::dto::{CommentForm, PageQuery, PostForm};

use super::{post_url, profile_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{
    self, CommentView, CreatePostTemplate, FollowTemplate, GroupListTemplate, IndexTemplate,
    PostCard, PostDetailTemplate, PostFormView, ProfileTemplate, ProfileView, Viewer,
};

fn page_request(query: &PageQuery) -> PageRequest {
    PageRequest::parse(query.page.as_deref())
}

/// Ids in paths are parsed by hand so a malformed one gets the regular 404 page.
pub(crate) fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("post '{raw}'")))
}

/// Cache key of one rendering of the global feed.
fn index_cache_key(request: PageRequest, viewer: &Viewer) -> String {
    match &viewer.username {
        Some(username) => format!("feed:index:page={}:user={}", request.number(), username),
        None => format!("feed:index:page={}:anon", request.number()),
    }
}

/// GET / - cached for the page cache TTL.
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = page_request(&query);
    let viewer = identity.viewer();
    let key = index_cache_key(request, &viewer);

    let body = state
        .page_cache
        .get_or_render(&key, || render_index(&state, viewer, request))
        .await?;

    Ok(views::html_response(StatusCode::OK, body))
}

async fn render_index(state: &AppState, viewer: Viewer, request: PageRequest) -> AppResult<String> {
    let (posts, page) = views::feed(state.feeds.global(request).await?);
    views::render(&IndexTemplate {
        viewer,
        posts,
        page,
    })
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let (group, page) = state.feeds.group(&slug, page_request(&query)).await?;
    let (posts, page) = views::feed(page);

    views::page(GroupListTemplate {
        viewer: identity.viewer(),
        group,
        posts,
        page,
    })
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let (author, page) = state.feeds.author(&username, page_request(&query)).await?;

    let can_follow = identity.user_id().is_some_and(|id| id != author.id);
    let following = match identity.user_id() {
        Some(viewer_id) if can_follow => state.follows.is_following(viewer_id, author.id).await?,
        _ => false,
    };

    let profile = ProfileView::new(&author, page.total);
    let (posts, page) = views::feed(page);

    views::page(ProfileTemplate {
        viewer: identity.viewer(),
        author: profile,
        following,
        can_follow,
        posts,
        page,
    })
}

/// GET /follow/ - posts of the authors the viewer follows.
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feeds
        .followed_by(identity.user_id, page_request(&query))
        .await?;
    let (posts, page) = views::feed(page);

    views::page(FollowTemplate {
        viewer: identity.viewer(),
        posts,
        page,
    })
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path)?;
    let detail = state.posts.detail(post_id).await?;

    let can_edit = identity.user_id() == Some(detail.entry.post.author_id);

    views::page(PostDetailTemplate {
        viewer: identity.viewer(),
        can_edit,
        can_comment: identity.0.is_some(),
        author_posts: detail.author_posts,
        post: PostCard::from(detail.entry),
        comments: detail.comments.into_iter().map(CommentView::from).collect(),
    })
}

/// Render the create/edit form, with messages when `errors` is not empty.
async fn post_form_page(
    state: &AppState,
    identity: &Identity,
    form: &PostForm,
    errors: &FormErrors,
    editing: Option<i64>,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list().await?;
    let action = match editing {
        Some(post_id) => format!("/posts/{post_id}/edit/"),
        None => "/create/".to_string(),
    };

    views::page(CreatePostTemplate {
        viewer: identity.viewer(),
        is_edit: editing.is_some(),
        action,
        form: PostFormView::new(form, groups, errors),
    })
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    post_form_page(&state, &identity, &PostForm::default(), &FormErrors::new(), None).await
}

/// POST /create/ - on success, back to the author's profile.
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    match state.posts.create(identity.user_id, &form).await {
        Ok(_) => Ok(redirect(&profile_url(&identity.username))),
        Err(DomainError::Validation(errors)) => {
            post_form_page(&state, &identity, &form, &errors, None).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{post_id}/edit/ - only the author gets the form.
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path)?;

    match state.posts.edit_access(identity.user_id, post_id).await? {
        EditAccess::NotAuthor => Ok(redirect(&profile_url(&identity.username))),
        EditAccess::Author(post) => {
            let form = PostForm {
                text: post.text,
                group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
                image: post.image.unwrap_or_default(),
            };
            post_form_page(&state, &identity, &form, &FormErrors::new(), Some(post_id)).await
        }
    }
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path)?;

    match state.posts.edit(identity.user_id, post_id, &form).await {
        Ok(EditAccess::Author(_)) => Ok(redirect(&post_url(post_id))),
        Ok(EditAccess::NotAuthor) => Ok(redirect(&profile_url(&identity.username))),
        Err(DomainError::Validation(errors)) => {
            post_form_page(&state, &identity, &form, &errors, Some(post_id)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{post_id}/comment/ - always lands back on the post.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = parse_id(&path)?;

    match state.posts.add_comment(identity.user_id, post_id, &form).await {
        Ok(()) => {}
        Err(DomainError::Validation(errors)) => {
            tracing::debug!(post_id, %errors, "Discarded invalid comment");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(redirect(&post_url(post_id)))
}

/// GET /profile/{username}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let outcome = state.follows.follow(identity.user_id, &username).await?;
    tracing::debug!(?outcome, follower = %identity.username, author = %username, "Follow request");

    Ok(redirect(&profile_url(&username)))
}

/// GET /profile/{username}/unfollow/ - 404 when there was nothing to remove.
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    state.follows.unfollow(identity.user_id, &username).await?;

    Ok(redirect(&profile_url(&username)))
}
