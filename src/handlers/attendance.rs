use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::attendance_service::{
    self, AttendanceMark, AttendanceRecord, AttendanceSummary, StatusCount,
};
use crate::tenancy::TenantContext;

#[derive(Debug, Deserialize)]
pub struct MarkRequest {
    pub records: Vec<AttendanceMark>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ClassReportQuery {
    pub date: NaiveDate,
}

/// POST /api/attendance - bulk mark
pub async fn mark(
    Extension(ctx): Extension<TenantContext>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<MarkRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.records.is_empty() {
        return Err(ApiError::bad_request("No attendance records provided"));
    }

    attendance_service::mark_attendance(&ctx, principal.user_id, &payload.records).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "marked": payload.records.len() })),
    ))
}

/// GET /api/attendance/student/:id
pub async fn student_history(
    Extension(ctx): Extension<TenantContext>,
    Path(student_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let records =
        attendance_service::get_student_attendance(&ctx, student_id, range.from, range.to).await?;
    Ok(Json(records))
}

/// GET /api/attendance/student/:id/summary
pub async fn student_summary(
    Extension(ctx): Extension<TenantContext>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<AttendanceSummary>, ApiError> {
    Ok(Json(
        attendance_service::get_attendance_summary(&ctx, student_id).await?,
    ))
}

/// GET /api/attendance/class/:class_id
pub async fn class_report(
    Extension(ctx): Extension<TenantContext>,
    Path(class_id): Path<String>,
    Query(query): Query<ClassReportQuery>,
) -> Result<Json<Vec<StatusCount>>, ApiError> {
    Ok(Json(
        attendance_service::get_class_report(&ctx, &class_id, query.date).await?,
    ))
}
