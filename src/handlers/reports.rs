use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::report_service::{
    self, AttendanceReportFilters, AttendanceSummaryRow, FeeOutstandingRow, GradeDistributionRow,
};
use crate::tenancy::TenantContext;

#[derive(Debug, Deserialize)]
pub struct FeeReportQuery {
    pub status: Option<String>,
}

/// GET /api/reports/attendance
pub async fn attendance(
    Extension(ctx): Extension<TenantContext>,
    Query(filters): Query<AttendanceReportFilters>,
) -> Result<Json<Vec<AttendanceSummaryRow>>, ApiError> {
    Ok(Json(report_service::attendance_summary(&ctx, &filters).await?))
}

/// GET /api/reports/grades/:exam_id
pub async fn grades(
    Extension(ctx): Extension<TenantContext>,
    Path(exam_id): Path<Uuid>,
) -> Result<Json<Vec<GradeDistributionRow>>, ApiError> {
    Ok(Json(report_service::grade_distribution(&ctx, exam_id).await?))
}

/// GET /api/reports/fees
pub async fn fees(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<FeeReportQuery>,
) -> Result<Json<Vec<FeeOutstandingRow>>, ApiError> {
    Ok(Json(
        report_service::fee_outstanding(&ctx, query.status.as_deref()).await?,
    ))
}
