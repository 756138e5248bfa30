//! Staff pages: group management and post removal.

use actix_web::{HttpResponse, web};

use yatube_core::error::DomainError;
use yatube_shared::FormErrors;
use yatube_shared::dto::GroupForm;

use super::posts::parse_id;
use super::redirect;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{self, AdminGroupsTemplate, FieldView};

fn require_admin(identity: &Identity) -> AppResult<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = identity.user_id, "Non-admin tried to reach the admin area");
        Err(AppError::Forbidden)
    }
}

fn group_fields(form: &GroupForm, errors: &FormErrors) -> Vec<FieldView> {
    vec![
        FieldView::new("title", "Title", "text", &form.title, errors),
        FieldView::new("slug", "Slug", "text", &form.slug, errors),
        FieldView::new("description", "Description", "text", &form.description, errors)
            .optional(),
    ]
}

async fn groups_page(
    state: &AppState,
    identity: &Identity,
    form: &GroupForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    views::page(AdminGroupsTemplate {
        viewer: identity.viewer(),
        groups: state.groups.list().await?,
        fields: group_fields(form, errors),
        general_errors: errors.general().to_vec(),
    })
}

/// GET /admin/groups/
pub async fn groups(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    require_admin(&identity)?;
    groups_page(&state, &identity, &GroupForm::default(), &FormErrors::new()).await
}

/// POST /admin/groups/
pub async fn create_group(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<GroupForm>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    match state.groups.create(&form).await {
        Ok(_) => Ok(redirect("/admin/groups/")),
        Err(DomainError::Validation(errors)) => groups_page(&state, &identity, &form, &errors).await,
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/posts/{post_id}/delete/
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;
    let post_id = parse_id(&path)?;

    state.posts.delete(post_id).await?;
    tracing::info!(post_id, admin = %identity.username, "Post removed by admin");

    Ok(redirect("/"))
}
