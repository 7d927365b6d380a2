use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::teacher_service::{self, Teacher, TeacherInput};
use crate::tenancy::TenantContext;

pub async fn list(Extension(ctx): Extension<TenantContext>) -> Result<Json<Vec<Teacher>>, ApiError> {
    Ok(Json(teacher_service::list_teachers(&ctx).await?))
}

pub async fn show(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, ApiError> {
    let teacher = teacher_service::get_teacher(&ctx, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;
    Ok(Json(teacher))
}

pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<TeacherInput>,
) -> Result<(StatusCode, Json<Teacher>), ApiError> {
    let teacher = teacher_service::create_teacher(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

pub async fn update(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeacherInput>,
) -> Result<Json<Teacher>, ApiError> {
    let teacher = teacher_service::update_teacher(&ctx, id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;
    Ok(Json(teacher))
}

pub async fn delete(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    teacher_service::delete_teacher(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
