//! Community management for admins.

use std::sync::Arc;

use yatube_shared::FormErrors;
use yatube_shared::dto::GroupForm;

use crate::domain::{Group, GroupDraft};
use crate::error::{DomainError, RepoError};
use crate::ports::GroupRepository;

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    /// Every group, ordered by title.
    pub async fn list(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.groups.list_all().await?)
    }

    pub async fn create(&self, form: &GroupForm) -> Result<Group, DomainError> {
        let draft = GroupDraft::from_form(form).map_err(DomainError::Validation)?;

        if self.groups.find_by_slug(&draft.slug).await?.is_some() {
            return Err(DomainError::Validation(slug_taken()));
        }

        match self.groups.create(draft).await {
            Ok(group) => {
                tracing::info!(group_id = group.id, slug = %group.slug, "Group created");
                Ok(group)
            }
            Err(RepoError::Constraint(_)) => Err(DomainError::Validation(slug_taken())),
            Err(e) => Err(e.into()),
        }
    }
}

fn slug_taken() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("slug", "Group with this slug already exists.");
    errors
}
