//! Registration and credential checks.

use std::sync::Arc;

use yatube_shared::FormErrors;
use yatube_shared::dto::SignupForm;

use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};

const PASSWORD_MIN_LEN: usize = 8;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Validate `form` and store the new user.
    pub async fn register(&self, form: &SignupForm) -> Result<User, DomainError> {
        let username = form.username.trim();
        let email = form.email.trim();
        let mut errors = FormErrors::new();

        if username.is_empty() {
            errors.add("username", "This field is required.");
        } else if !User::is_valid_username(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if !email.is_empty() && !is_plausible_email(email) {
            errors.add("email", "Enter a valid email address.");
        }

        if form.password1.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "password1",
                "This password is too short. It must contain at least 8 characters.",
            );
        }
        if form.password1 != form.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        if errors.is_empty() && self.users.find_by_username(username).await?.is_some() {
            errors.add("username", "A user with that username already exists.");
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let password_hash = self
            .passwords
            .hash(&form.password1)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                first_name: form.first_name.trim().to_string(),
                last_name: form.last_name.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => {
                    let mut errors = FormErrors::new();
                    errors.add("username", "A user with that username already exists.");
                    DomainError::Validation(errors)
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// The user owning `username` when `password` matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(DomainError::Unauthorized);
        }
        Ok(user)
    }

    pub async fn find(&self, user_id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_id(user_id).await?)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
