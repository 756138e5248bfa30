//! HTTP handlers and route configuration.

mod about;
mod admin;
mod health;
mod posts;
mod users;

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Feeds
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/follow/", web::get().to(posts::follow_index))
        // Posts
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route("/posts/{post_id}/comment/", web::post().to(posts::add_comment))
        // Follows
        .route("/profile/{username}/follow/", web::get().to(posts::profile_follow))
        .route("/profile/{username}/unfollow/", web::get().to(posts::profile_unfollow))
        // Static pages
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        // Accounts
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(users::signup_form))
                        .route(web::post().to(users::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(users::login_form))
                        .route(web::post().to(users::login)),
                )
                .route("/logout/", web::get().to(users::logout)),
        )
        // Administration
        .service(
            web::scope("/admin")
                .service(
                    web::resource("/groups/")
                        .route(web::get().to(admin::groups))
                        .route(web::post().to(admin::create_group)),
                )
                .route("/posts/{post_id}/delete/", web::post().to(admin::delete_post)),
        );
}

/// Fallback for every unmatched path.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// 302 to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub(crate) fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}
