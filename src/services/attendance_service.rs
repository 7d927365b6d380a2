use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Option<String>,
    pub status: String,
    pub marked_by: Uuid,
    pub attendance_date: NaiveDate,
    pub metadata: Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceMark {
    pub student_id: Uuid,
    pub class_id: Option<String>,
    pub status: String,
    pub date: NaiveDate,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceSummary {
    pub present_count: f64,
    pub total_count: f64,
}

const VALID_STATUSES: &[&str] = &["present", "absent", "late"];

fn table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.attendance_records"))
}

/// Bulk mark attendance; re-marking the same student/class/date overwrites
/// the earlier status.
pub async fn mark_attendance(
    ctx: &TenantContext,
    marked_by: Uuid,
    records: &[AttendanceMark],
) -> Result<(), ApiError> {
    let (_, schema) = ctx.require()?;

    for record in records {
        if !VALID_STATUSES.contains(&record.status.as_str()) {
            return Err(ApiError::bad_request(format!(
                "Invalid attendance status: {}",
                record.status
            )));
        }
    }

    let query = format!(
        "INSERT INTO {} (student_id, class_id, status, marked_by, attendance_date, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (student_id, class_id, attendance_date) \
         DO UPDATE SET \
             status = EXCLUDED.status, \
             marked_by = EXCLUDED.marked_by, \
             metadata = EXCLUDED.metadata, \
             recorded_at = NOW()",
        table(schema)?
    );

    for record in records {
        sqlx::query(&query)
            .bind(record.student_id)
            .bind(&record.class_id)
            .bind(&record.status)
            .bind(marked_by)
            .bind(record.date)
            .bind(record.metadata.clone().unwrap_or_else(|| Value::Object(Default::default())))
            .execute(ctx.pool())
            .await?;
    }

    info!(
        count = records.len(),
        marked_by = %marked_by,
        "attendance marked"
    );
    Ok(())
}

pub async fn get_student_attendance(
    ctx: &TenantContext,
    student_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<AttendanceRecord>, ApiError> {
    let (_, schema) = ctx.require()?;
    let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT * FROM {} \
         WHERE student_id = $1 \
           AND ($2::date IS NULL OR attendance_date >= $2::date) \
           AND ($3::date IS NULL OR attendance_date <= $3::date) \
         ORDER BY attendance_date DESC",
        table(schema)?
    ))
    .bind(student_id)
    .bind(from)
    .bind(to)
    .fetch_all(ctx.pool())
    .await?;
    Ok(records)
}

/// Status counts for one class on one day
pub async fn get_class_report(
    ctx: &TenantContext,
    class_id: &str,
    date: NaiveDate,
) -> Result<Vec<StatusCount>, ApiError> {
    let (_, schema) = ctx.require()?;
    let counts = sqlx::query_as::<_, StatusCount>(&format!(
        "SELECT status, COUNT(*) AS count FROM {} \
         WHERE class_id = $1 AND attendance_date = $2 \
         GROUP BY status",
        table(schema)?
    ))
    .bind(class_id)
    .bind(date)
    .fetch_all(ctx.pool())
    .await?;
    Ok(counts)
}

pub async fn get_attendance_summary(
    ctx: &TenantContext,
    student_id: Uuid,
) -> Result<AttendanceSummary, ApiError> {
    let (_, schema) = ctx.require()?;
    let summary = sqlx::query_as::<_, AttendanceSummary>(&format!(
        "SELECT \
             COALESCE(SUM(CASE WHEN status = 'present' THEN 1 ELSE 0 END), 0)::float AS present_count, \
             COUNT(*)::float AS total_count \
         FROM {} WHERE student_id = $1",
        table(schema)?
    ))
    .bind(student_id)
    .fetch_one(ctx.pool())
    .await?;
    Ok(summary)
}
