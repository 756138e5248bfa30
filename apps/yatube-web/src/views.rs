//! Askama templates and the view models they render.

use actix_web::{HttpResponse, http::StatusCode};
use askama::Template;

use yatube_core::Page;
use yatube_core::domain::{CommentEntry, Group, GroupRef, PostEntry, User};
use yatube_shared::FormErrors;
use yatube_shared::dto::PostForm;

use crate::middleware::error::{AppError, AppResult};

const DATE_FORMAT: &str = "%d %B %Y";

/// Who is looking at the page, for the navigation bar.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub username: Option<String>,
    pub is_admin: bool,
}

/// One post as shown in a listing or on its own page.
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
    pub created: String,
}

impl From<PostEntry> for PostCard {
    fn from(entry: PostEntry) -> Self {
        Self {
            id: entry.post.id,
            created: entry.post.created_at.format(DATE_FORMAT).to_string(),
            text: entry.post.text,
            image: entry.post.image,
            author: entry.author,
            group: entry.group,
        }
    }
}

pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<CommentEntry> for CommentView {
    fn from(entry: CommentEntry) -> Self {
        Self {
            author: entry.author,
            created: entry.comment.created_at.format(DATE_FORMAT).to_string(),
            text: entry.comment.text,
        }
    }
}

/// Navigation under a listing.
pub struct PaginatorView {
    pub number: usize,
    pub num_pages: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub multiple: bool,
}

impl<T> From<&Page<T>> for PaginatorView {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            previous: page.previous_page_number(),
            next: page.next_page_number(),
            multiple: page.num_pages > 1,
        }
    }
}

/// Split a feed page into cards and paginator state.
pub fn feed(page: Page<PostEntry>) -> (Vec<PostCard>, PaginatorView) {
    let paginator = PaginatorView::from(&page);
    let cards = page.items.into_iter().map(PostCard::from).collect();
    (cards, paginator)
}

/// A plain input with its current value and messages.
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub required: bool,
    pub errors: Vec<String>,
}

impl FieldView {
    pub fn new(
        name: &'static str,
        label: &'static str,
        input_type: &'static str,
        value: &str,
        errors: &FormErrors,
    ) -> Self {
        Self {
            name,
            label,
            input_type,
            value: value.to_string(),
            required: true,
            errors: errors.field(name).to_vec(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

/// The post form, with the group choices resolved.
pub struct PostFormView {
    pub text: String,
    pub image: String,
    pub groups: Vec<GroupOption>,
    pub no_group_selected: bool,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
    pub image_errors: Vec<String>,
}

impl PostFormView {
    pub fn new(form: &PostForm, groups: Vec<Group>, errors: &FormErrors) -> Self {
        let chosen = form.group.trim();
        let groups: Vec<GroupOption> = groups
            .into_iter()
            .map(|group| GroupOption {
                selected: chosen == group.id.to_string(),
                id: group.id,
                title: group.title,
            })
            .collect();

        Self {
            text: form.text.clone(),
            image: form.image.clone(),
            no_group_selected: !groups.iter().any(|g| g.selected),
            groups,
            text_errors: errors.field("text").to_vec(),
            group_errors: errors.field("group").to_vec(),
            image_errors: errors.field("image").to_vec(),
        }
    }
}

pub struct ProfileView {
    pub username: String,
    pub full_name: String,
    pub post_count: u64,
}

impl ProfileView {
    pub fn new(user: &User, post_count: u64) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.display_name(),
            post_count,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub viewer: Viewer,
    pub posts: Vec<PostCard>,
    pub page: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub viewer: Viewer,
    pub group: Group,
    pub posts: Vec<PostCard>,
    pub page: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub viewer: Viewer,
    pub author: ProfileView,
    pub following: bool,
    pub can_follow: bool,
    pub posts: Vec<PostCard>,
    pub page: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub viewer: Viewer,
    pub post: PostCard,
    pub author_posts: u64,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
    pub can_comment: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct CreatePostTemplate {
    pub viewer: Viewer,
    pub is_edit: bool,
    pub action: String,
    pub form: PostFormView,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub viewer: Viewer,
    pub posts: Vec<PostCard>,
    pub page: PaginatorView,
}

#[derive(Template)]
#[template(path = "about/author.html")]
pub struct AboutAuthorTemplate {
    pub viewer: Viewer,
}

#[derive(Template)]
#[template(path = "about/tech.html")]
pub struct AboutTechTemplate {
    pub viewer: Viewer,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub viewer: Viewer,
    pub fields: Vec<FieldView>,
    pub general_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub viewer: Viewer,
    pub action: String,
    pub username: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/logged_out.html")]
pub struct LoggedOutTemplate {
    pub viewer: Viewer,
}

#[derive(Template)]
#[template(path = "admin/groups.html")]
pub struct AdminGroupsTemplate {
    pub viewer: Viewer,
    pub groups: Vec<Group>,
    pub fields: Vec<FieldView>,
    pub general_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundPage {
    pub viewer: Viewer,
}

#[derive(Template)]
#[template(path = "core/403.html")]
pub struct ForbiddenPage {
    pub viewer: Viewer,
}

#[derive(Template)]
#[template(path = "core/400.html")]
pub struct BadRequestPage {
    pub viewer: Viewer,
}

#[derive(Template)]
#[template(path = "core/500.html")]
pub struct ServerErrorPage {
    pub viewer: Viewer,
}

/// The error pages, picked by status.
pub enum ErrorTemplate {
    NotFound(NotFoundPage),
    Forbidden(ForbiddenPage),
    BadRequest(BadRequestPage),
    ServerError(ServerErrorPage),
}

impl ErrorTemplate {
    pub fn not_found() -> Self {
        Self::NotFound(NotFoundPage {
            viewer: Viewer::default(),
        })
    }

    pub fn forbidden() -> Self {
        Self::Forbidden(ForbiddenPage {
            viewer: Viewer::default(),
        })
    }

    pub fn bad_request() -> Self {
        Self::BadRequest(BadRequestPage {
            viewer: Viewer::default(),
        })
    }

    pub fn server_error() -> Self {
        Self::ServerError(ServerErrorPage {
            viewer: Viewer::default(),
        })
    }

    pub fn render_page(&self) -> Result<String, askama::Error> {
        match self {
            Self::NotFound(page) => page.render(),
            Self::Forbidden(page) => page.render(),
            Self::BadRequest(page) => page.render(),
            Self::ServerError(page) => page.render(),
        }
    }
}

pub fn html_response(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Render `template` to a string.
pub fn render<T: Template>(template: &T) -> AppResult<String> {
    template.render().map_err(AppError::from)
}

/// Render `template` as a 200 page.
pub fn page<T: Template>(template: T) -> AppResult<HttpResponse> {
    Ok(html_response(StatusCode::OK, render(&template)?))
}
