use std::fmt;

use serde::{Deserialize, Serialize};
use yatube_shared::FormErrors;
use yatube_shared::dto::GroupForm;

const TITLE_MAX_LEN: usize = 200;

/// Group entity - a community posts can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    /// Slugs are non-empty and made of ASCII letters, digits, `-` and `_`.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn to_ref(&self) -> GroupRef {
        GroupRef {
            slug: self.slug.clone(),
            title: self.title.clone(),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Just enough of a group to link to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

/// Validated group form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl GroupDraft {
    pub fn from_form(form: &GroupForm) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();

        let title = form.title.trim();
        if title.is_empty() {
            errors.add("title", "This field is required.");
        } else if title.chars().count() > TITLE_MAX_LEN {
            errors.add("title", "Ensure this value has at most 200 characters.");
        }

        let slug = form.slug.trim();
        if !Group::is_valid_slug(slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }

        errors.into_result(Self {
            title: title.to_string(),
            slug: slug.to_string(),
            description: form.description.trim().to_string(),
        })
    }
}
