//! Session extractors.
//!
//! The session token lives in the `yatube_session` cookie; an
//! `Authorization: Bearer` header is accepted as well.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use std::fmt;
use std::future::{Ready, ready};
use std::sync::Arc;
use url::form_urlencoded;

use yatube_core::ports::{AuthError, TokenClaims, TokenService};

use crate::views::Viewer;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yatube_session";

pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require a session:
/// ```ignore
/// async fn post_create(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    pub fn viewer(&self) -> Viewer {
        Viewer {
            username: Some(self.username.clone()),
            is_admin: self.is_admin(),
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

/// Rejection for protected pages: a redirect to the login form.
#[derive(Debug)]
pub struct LoginRequired {
    next: String,
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required for {}", self.next)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, login_url(&self.next)))
            .finish()
    }
}

/// `/auth/login/?next=<path>`.
pub fn login_url(next: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Only local absolute paths are followed after login. Browsers read `/\host`
/// as `//host`, so a backslash in second place is refused like a slash.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !matches!(path.as_bytes().get(1), Some(b'/' | b'\\'))
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

/// Session cookie carrying `token`.
pub fn session_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(actix_web::cookie::time::Duration::seconds(max_age_secs))
        .finish()
}

/// Cookie that makes the browser drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(String::from)
}

/// Decode the request's session, if any.
fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(tokens) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
        tracing::error!("TokenService not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let token = req
        .cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| bearer_token(req))
        .ok_or(AuthError::MissingSession)?;

    tokens.validate_token(&token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match authenticate(req) {
            Ok(identity) => ready(Ok(identity)),
            Err(e) => {
                if !matches!(e, AuthError::MissingSession) {
                    tracing::debug!(error = %e, "Rejected session token");
                }
                ready(Err(LoginRequired {
                    next: req.path().to_string(),
                }))
            }
        }
    }
}

/// Optional identity extractor - anonymous visitors get `None`.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Viewer {
        self.0.as_ref().map(Identity::viewer).unwrap_or_default()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
