use axum::{extract::Extension, http::StatusCode, response::Json};

use crate::error::ApiError;
use crate::services::term_service::{self, AcademicTerm, ClassInput, SchoolClass, TermInput};
use crate::tenancy::TenantContext;

pub async fn list_terms(
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<AcademicTerm>>, ApiError> {
    Ok(Json(term_service::list_terms(&ctx).await?))
}

pub async fn create_term(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<TermInput>,
) -> Result<(StatusCode, Json<AcademicTerm>), ApiError> {
    let term = term_service::create_term(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(term)))
}

pub async fn list_classes(
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<SchoolClass>>, ApiError> {
    Ok(Json(term_service::list_classes(&ctx).await?))
}

pub async fn upsert_class(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<ClassInput>,
) -> Result<(StatusCode, Json<SchoolClass>), ApiError> {
    let class = term_service::upsert_class(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(class)))
}
