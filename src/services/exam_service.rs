use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub subject: Option<String>,
    pub class_id: Option<String>,
    pub held_on: Option<NaiveDate>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub score: Option<f64>,
    pub grade: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ExamInput {
    pub name: String,
    pub subject: Option<String>,
    pub class_id: Option<String>,
    pub held_on: Option<NaiveDate>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct GradeEntry {
    pub student_id: Uuid,
    pub subject: String,
    pub score: Option<f64>,
    pub grade: Option<String>,
    pub metadata: Option<Value>,
}

fn exams_table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.exams"))
}

fn grades_table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.grades"))
}

pub async fn create_exam(ctx: &TenantContext, input: ExamInput) -> Result<Exam, ApiError> {
    let (_, schema) = ctx.require()?;
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("Exam name is required"));
    }

    let exam = sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO {} (name, subject, class_id, held_on, metadata) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
        exams_table(schema)?
    ))
    .bind(&input.name)
    .bind(&input.subject)
    .bind(&input.class_id)
    .bind(input.held_on)
    .bind(input.metadata.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(ctx.pool())
    .await?;
    Ok(exam)
}

pub async fn list_exams(ctx: &TenantContext) -> Result<Vec<Exam>, ApiError> {
    let (_, schema) = ctx.require()?;
    let exams = sqlx::query_as::<_, Exam>(&format!(
        "SELECT * FROM {} ORDER BY held_on DESC NULLS LAST, created_at DESC",
        exams_table(schema)?
    ))
    .fetch_all(ctx.pool())
    .await?;
    Ok(exams)
}

/// Bulk grade entry for one exam; re-entering a student/subject pair
/// replaces the earlier score.
pub async fn bulk_upsert_grades(
    ctx: &TenantContext,
    exam_id: Uuid,
    entries: &[GradeEntry],
) -> Result<Vec<Grade>, ApiError> {
    let (tenant, schema) = ctx.require()?;

    let query = format!(
        "INSERT INTO {} (exam_id, student_id, subject, score, grade, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (exam_id, student_id, subject) \
         DO UPDATE SET \
             score = EXCLUDED.score, \
             grade = EXCLUDED.grade, \
             metadata = EXCLUDED.metadata, \
             updated_at = NOW() \
         RETURNING *",
        grades_table(schema)?
    );

    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.subject.trim().is_empty() {
            return Err(ApiError::bad_request("Grade subject is required"));
        }
        let grade = sqlx::query_as::<_, Grade>(&query)
            .bind(exam_id)
            .bind(entry.student_id)
            .bind(&entry.subject)
            .bind(entry.score)
            .bind(&entry.grade)
            .bind(entry.metadata.clone().unwrap_or_else(|| Value::Object(Default::default())))
            .fetch_one(ctx.pool())
            .await?;
        saved.push(grade);
    }

    info!(
        tenant = %tenant.schema_name,
        exam_id = %exam_id,
        count = saved.len(),
        "grades recorded"
    );
    Ok(saved)
}

pub async fn get_student_results(
    ctx: &TenantContext,
    student_id: Uuid,
) -> Result<Vec<Grade>, ApiError> {
    let (_, schema) = ctx.require()?;
    let grades = sqlx::query_as::<_, Grade>(&format!(
        "SELECT * FROM {} WHERE student_id = $1 ORDER BY created_at DESC",
        grades_table(schema)?
    ))
    .bind(student_id)
    .fetch_all(ctx.pool())
    .await?;
    Ok(grades)
}
