//! Static pages.

use actix_web::HttpResponse;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::views::{self, AboutAuthorTemplate, AboutTechTemplate};

/// GET /about/author/
pub async fn author(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    views::page(AboutAuthorTemplate {
        viewer: identity.viewer(),
    })
}

/// GET /about/tech/
pub async fn tech(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    views::page(AboutTechTemplate {
        viewer: identity.viewer(),
    })
}
