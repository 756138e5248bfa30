//! Sign up, log in and log out.

use actix_web::http::header;
use actix_web::{HttpResponse, web};

use yatube_core::domain::User;
use yatube_core::error::DomainError;
use yatube_shared::FormErrors;
use yatube_shared::dto::{LoginForm, NextQuery, SignupForm};

use crate::middleware::auth::{OptionalIdentity, login_url, removal_cookie, safe_next, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{self, FieldView, LoggedOutTemplate, LoginTemplate, SignupTemplate, Viewer};

const BAD_CREDENTIALS: &str = "Please enter a correct username and password. \
Note that both fields may be case-sensitive.";

fn signup_fields(form: &SignupForm, errors: &FormErrors) -> Vec<FieldView> {
    vec![
        FieldView::new("first_name", "First name", "text", &form.first_name, errors).optional(),
        FieldView::new("last_name", "Last name", "text", &form.last_name, errors).optional(),
        FieldView::new("username", "Username", "text", &form.username, errors),
        FieldView::new("email", "Email address", "email", &form.email, errors).optional(),
        FieldView::new("password1", "Password", "password", "", errors),
        FieldView::new("password2", "Password confirmation", "password", "", errors),
    ]
}

/// Issue a session for `user` and send the browser to `location`.
fn start_session(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, state.roles_for(&user.username))
        .map_err(|e| AppError::Internal(format!("failed to issue session: {e}")))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(session_cookie(token, state.tokens.expiration_seconds()))
        .finish())
}

/// GET /auth/signup/
pub async fn signup_form(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    views::page(SignupTemplate {
        viewer: identity.viewer(),
        fields: signup_fields(&SignupForm::default(), &FormErrors::new()),
        general_errors: Vec::new(),
    })
}

/// POST /auth/signup/ - a successful registration also logs the user in.
pub async fn signup(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    match state.accounts.register(&form).await {
        Ok(user) => start_session(&state, &user, "/"),
        Err(DomainError::Validation(errors)) => views::page(SignupTemplate {
            viewer: identity.viewer(),
            fields: signup_fields(&form, &errors),
            general_errors: errors.general().to_vec(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/
pub async fn login_form(
    identity: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    views::page(LoginTemplate {
        viewer: identity.viewer(),
        action: login_url(safe_next(query.next.as_deref())),
        username: String::new(),
        error: None,
    })
}

/// POST /auth/login/ - continues to `next` on success.
pub async fn login(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let next = safe_next(query.next.as_deref());

    match state.accounts.authenticate(&form.username, &form.password).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "User logged in");
            start_session(&state, &user, next)
        }
        Err(DomainError::Unauthorized) => views::page(LoginTemplate {
            viewer: Viewer::default(),
            action: login_url(next),
            username: form.username.clone(),
            error: Some(BAD_CREDENTIALS.to_string()),
        }),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/logout/
pub async fn logout() -> AppResult<HttpResponse> {
    let body = views::render(&LoggedOutTemplate {
        viewer: Viewer::default(),
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .cookie(removal_cookie())
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_fields_keep_values_but_not_passwords() {
        let form = SignupForm {
            username: "leo".to_string(),
            password1: "secret-pass".to_string(),
            password2: "secret-pass".to_string(),
            ..SignupForm::default()
        };
        let mut errors = FormErrors::new();
        errors.add("username", "A user with that username already exists.");

        let fields = signup_fields(&form, &errors);
        let username = fields.iter().find(|f| f.name == "username").unwrap();
        assert_eq!(username.value, "leo");
        assert_eq!(username.errors.len(), 1);
        assert!(fields.iter().filter(|f| f.input_type == "password").all(|f| f.value.is_empty()));
    }
}
