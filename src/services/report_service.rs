use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceReportFilters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub class_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceSummaryRow {
    pub attendance_date: NaiveDate,
    pub class_id: Option<String>,
    pub status: String,
    pub count: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GradeDistributionRow {
    pub subject: String,
    pub grade: Option<String>,
    pub count: i32,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeeOutstandingRow {
    pub status: String,
    pub invoice_count: i32,
    pub total_amount: f64,
    pub total_paid: f64,
}

fn qualified(schema: &str, relation: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.{relation}"))
}

pub async fn attendance_summary(
    ctx: &TenantContext,
    filters: &AttendanceReportFilters,
) -> Result<Vec<AttendanceSummaryRow>, ApiError> {
    let (_, schema) = ctx.require()?;
    let rows = sqlx::query_as::<_, AttendanceSummaryRow>(&format!(
        "SELECT attendance_date, class_id, status, COUNT(*)::int AS count \
         FROM {} \
         WHERE ($1::date IS NULL OR attendance_date >= $1::date) \
           AND ($2::date IS NULL OR attendance_date <= $2::date) \
           AND ($3::text IS NULL OR class_id = $3::text) \
         GROUP BY attendance_date, class_id, status \
         ORDER BY attendance_date DESC, class_id, status",
        qualified(schema, "attendance_records")?
    ))
    .bind(filters.from)
    .bind(filters.to)
    .bind(&filters.class_id)
    .fetch_all(ctx.pool())
    .await?;
    Ok(rows)
}

pub async fn grade_distribution(
    ctx: &TenantContext,
    exam_id: Uuid,
) -> Result<Vec<GradeDistributionRow>, ApiError> {
    let (_, schema) = ctx.require()?;
    let rows = sqlx::query_as::<_, GradeDistributionRow>(&format!(
        "SELECT subject, grade, COUNT(*)::int AS count, AVG(score)::float AS average_score \
         FROM {} \
         WHERE exam_id = $1 \
         GROUP BY subject, grade \
         ORDER BY subject, grade",
        qualified(schema, "grades")?
    ))
    .bind(exam_id)
    .fetch_all(ctx.pool())
    .await?;
    Ok(rows)
}

pub async fn fee_outstanding(
    ctx: &TenantContext,
    status: Option<&str>,
) -> Result<Vec<FeeOutstandingRow>, ApiError> {
    let (_, schema) = ctx.require()?;
    let rows = sqlx::query_as::<_, FeeOutstandingRow>(&format!(
        "SELECT \
             fi.status, \
             COUNT(*)::int AS invoice_count, \
             SUM(fi.amount)::float AS total_amount, \
             SUM(COALESCE(paid.total_paid, 0))::float AS total_paid \
         FROM {invoices} fi \
         LEFT JOIN ( \
             SELECT invoice_id, SUM(amount) AS total_paid \
             FROM {payments} \
             WHERE status = 'succeeded' \
             GROUP BY invoice_id \
         ) AS paid ON paid.invoice_id = fi.id \
         WHERE ($1::text IS NULL OR fi.status = $1::text) \
         GROUP BY fi.status \
         ORDER BY fi.status",
        invoices = qualified(schema, "fee_invoices")?,
        payments = qualified(schema, "payments")?,
    ))
    .bind(status)
    .fetch_all(ctx.pool())
    .await?;
    Ok(rows)
}
