//! Error handling - every failure is answered with an HTML page.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use yatube_core::error::{DomainError, RepoError};

use crate::views::{self, ErrorTemplate};

/// Application-level error type rendered through the `core/*.html` pages.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Forbidden,
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let template = match self {
            AppError::NotFound(detail) => {
                tracing::debug!("Not found: {}", detail);
                ErrorTemplate::not_found()
            }
            AppError::BadRequest(detail) => {
                tracing::debug!("Bad request: {}", detail);
                ErrorTemplate::bad_request()
            }
            AppError::Forbidden => ErrorTemplate::forbidden(),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorTemplate::server_error()
            }
        };

        match template.render_page() {
            Ok(body) => views::html_response(self.status_code(), body),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                HttpResponse::build(self.status_code())
                    .content_type("text/plain; charset=utf-8")
                    .body(self.status_code().to_string())
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} '{}' not found", entity_type, key))
            }
            DomainError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Unauthorized => AppError::Forbidden,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::from(DomainError::from(err))
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {err}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
