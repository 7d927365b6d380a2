use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::student_service::{self, Student, StudentInput, StudentUpdate};
use crate::tenancy::TenantContext;

pub async fn list(Extension(ctx): Extension<TenantContext>) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(student_service::list_students(&ctx).await?))
}

pub async fn show(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, ApiError> {
    let student = student_service::get_student(&ctx, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    Ok(Json(student))
}

pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<StudentInput>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = student_service::create_student(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StudentUpdate>,
) -> Result<Json<Student>, ApiError> {
    let student = student_service::update_student(&ctx, id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    Ok(Json(student))
}

pub async fn delete(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    student_service::delete_student(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
