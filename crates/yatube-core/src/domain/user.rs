use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted username.
pub const USERNAME_MAX_LEN: usize = 150;

/// User entity - a registered author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last" when a name was given, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Letters, digits and `@ . + - _`, at most 150 characters.
    pub fn is_valid_username(username: &str) -> bool {
        !username.is_empty()
            && username.chars().count() <= USERNAME_MAX_LEN
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    }
}

/// A user that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            username: "leo".to_string(),
            email: "leo@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(user("", "").display_name(), "leo");
        assert_eq!(user("Leo", "Tolstoy").display_name(), "Leo Tolstoy");
    }

    #[test]
    fn test_username_rules() {
        assert!(User::is_valid_username("author"));
        assert!(User::is_valid_username("a.b+c-d_e@f"));
        assert!(!User::is_valid_username(""));
        assert!(!User::is_valid_username("has space"));
        assert!(!User::is_valid_username("slash/name"));
        assert!(!User::is_valid_username(&"x".repeat(151)));
    }
}
