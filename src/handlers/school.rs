use axum::{extract::Extension, response::Json};

use crate::error::ApiError;
use crate::services::school_service::{self, School, SchoolInput};
use crate::tenancy::TenantContext;

pub async fn show(Extension(ctx): Extension<TenantContext>) -> Result<Json<School>, ApiError> {
    let school = school_service::get_school(&ctx)
        .await?
        .ok_or_else(|| ApiError::not_found("School profile not configured"))?;
    Ok(Json(school))
}

pub async fn upsert(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<SchoolInput>,
) -> Result<Json<School>, ApiError> {
    Ok(Json(school_service::upsert_school(&ctx, payload).await?))
}
