use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::exam_service::{self, Exam, ExamInput, Grade, GradeEntry};
use crate::tenancy::TenantContext;

#[derive(Debug, Deserialize)]
pub struct GradeBulkRequest {
    pub grades: Vec<GradeEntry>,
}

pub async fn list(Extension(ctx): Extension<TenantContext>) -> Result<Json<Vec<Exam>>, ApiError> {
    Ok(Json(exam_service::list_exams(&ctx).await?))
}

pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<ExamInput>,
) -> Result<(StatusCode, Json<Exam>), ApiError> {
    let exam = exam_service::create_exam(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

/// POST /api/exams/:id/grades - bulk grade entry
pub async fn record_grades(
    Extension(ctx): Extension<TenantContext>,
    Path(exam_id): Path<Uuid>,
    Json(payload): Json<GradeBulkRequest>,
) -> Result<(StatusCode, Json<Vec<Grade>>), ApiError> {
    if payload.grades.is_empty() {
        return Err(ApiError::bad_request("No grades provided"));
    }
    let saved = exam_service::bulk_upsert_grades(&ctx, exam_id, &payload.grades).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/exams/results/student/:id
pub async fn student_results(
    Extension(ctx): Extension<TenantContext>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    Ok(Json(exam_service::get_student_results(&ctx, student_id).await?))
}
