use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yatube_shared::FormErrors;
use yatube_shared::dto::PostForm;

use super::GroupRef;

/// Number of characters shown when a post is named in a single line.
const PREVIEW_LEN: usize = 15;

/// File extensions accepted for an image reference.
pub const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

/// Post entity - a text entry written by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// The first characters of the text, used wherever a post needs a name.
    pub fn preview(&self) -> String {
        self.text.chars().take(PREVIEW_LEN).collect()
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub text: String,
    pub image: Option<String>,
}

/// Validated contents of a post form, before group existence is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl PostDraft {
    pub fn from_form(form: &PostForm) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();

        let text = form.text.trim();
        if text.is_empty() {
            errors.add("text", "This field is required.");
        }

        let group = form.group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            match group.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", "Select a valid choice.");
                    None
                }
            }
        };

        let image = form.image.trim();
        let image = if image.is_empty() {
            None
        } else if is_image_reference(image) {
            Some(image.to_string())
        } else {
            errors.add(
                "image",
                format!(
                    "Upload a valid image. Allowed extensions are: {}.",
                    IMAGE_EXTENSIONS.join(", ")
                ),
            );
            None
        };

        errors.into_result(Self {
            text: text.to_string(),
            group_id,
            image,
        })
    }

    pub fn into_new_post(self, author_id: i64) -> NewPost {
        NewPost {
            author_id,
            group_id: self.group_id,
            text: self.text,
            image: self.image,
        }
    }
}

fn is_image_reference(value: &str) -> bool {
    if value.contains("..") || value.starts_with('/') {
        return false;
    }
    value
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
        .unwrap_or(false)
}

/// A post resolved for display: who wrote it and where it was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub post: Post,
    pub author: String,
    pub group: Option<GroupRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(text: &str, group: &str, image: &str) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.to_string(),
            image: image.to_string(),
        }
    }

    #[test]
    fn test_preview_is_first_fifteen_chars() {
        let post = Post {
            id: 1,
            author_id: 1,
            group_id: None,
            text: "Тестовый пост для проверки длины".to_string(),
            image: None,
            created_at: Utc::now(),
        };
        assert_eq!(post.preview(), "Тестовый пост д");
        assert_eq!(post.preview().chars().count(), 15);
    }

    #[test]
    fn test_draft_requires_text() {
        let errors = PostDraft::from_form(&form("   ", "", "")).unwrap_err();
        assert!(errors.has("text"));
    }

    #[test]
    fn test_draft_parses_group_and_image() {
        let draft = PostDraft::from_form(&form("Hello", "3", "posts/small.gif")).unwrap();
        assert_eq!(draft.group_id, Some(3));
        assert_eq!(draft.image.as_deref(), Some("posts/small.gif"));
    }

    #[test]
    fn test_draft_rejects_bad_group_and_image() {
        let errors = PostDraft::from_form(&form("Hello", "abc", "notes.txt")).unwrap_err();
        assert!(errors.has("group"));
        assert!(errors.has("image"));
        assert!(!errors.has("text"));
    }

    #[test]
    fn test_image_reference_rules() {
        assert!(is_image_reference("posts/a.PNG"));
        assert!(!is_image_reference(".gif"));
        assert!(!is_image_reference("../etc/a.gif"));
        assert!(!is_image_reference("/abs/a.gif"));
        assert!(!is_image_reference("noext"));
    }
}
