use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub subjects: Vec<String>,
    pub assigned_classes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TeacherInput {
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub assigned_classes: Vec<String>,
}

fn table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.teachers"))
}

pub async fn list_teachers(ctx: &TenantContext) -> Result<Vec<Teacher>, ApiError> {
    let (_, schema) = ctx.require()?;
    let teachers = sqlx::query_as::<_, Teacher>(&format!(
        "SELECT * FROM {} ORDER BY created_at DESC",
        table(schema)?
    ))
    .fetch_all(ctx.pool())
    .await?;
    Ok(teachers)
}

pub async fn get_teacher(ctx: &TenantContext, id: Uuid) -> Result<Option<Teacher>, ApiError> {
    let (_, schema) = ctx.require()?;
    let teacher = sqlx::query_as::<_, Teacher>(&format!(
        "SELECT * FROM {} WHERE id = $1",
        table(schema)?
    ))
    .bind(id)
    .fetch_optional(ctx.pool())
    .await?;
    Ok(teacher)
}

pub async fn create_teacher(ctx: &TenantContext, input: TeacherInput) -> Result<Teacher, ApiError> {
    let (_, schema) = ctx.require()?;
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("Teacher name is required"));
    }

    let teacher = sqlx::query_as::<_, Teacher>(&format!(
        "INSERT INTO {} (name, email, subjects, assigned_classes) \
         VALUES ($1, $2, $3, $4) RETURNING *",
        table(schema)?
    ))
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.subjects)
    .bind(&input.assigned_classes)
    .fetch_one(ctx.pool())
    .await?;
    Ok(teacher)
}

pub async fn update_teacher(
    ctx: &TenantContext,
    id: Uuid,
    input: TeacherInput,
) -> Result<Option<Teacher>, ApiError> {
    let (_, schema) = ctx.require()?;
    let teacher = sqlx::query_as::<_, Teacher>(&format!(
        "UPDATE {} SET \
             name = $1, \
             email = COALESCE($2, email), \
             subjects = $3, \
             assigned_classes = $4, \
             updated_at = NOW() \
         WHERE id = $5 RETURNING *",
        table(schema)?
    ))
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.subjects)
    .bind(&input.assigned_classes)
    .bind(id)
    .fetch_optional(ctx.pool())
    .await?;
    Ok(teacher)
}

pub async fn delete_teacher(ctx: &TenantContext, id: Uuid) -> Result<bool, ApiError> {
    let (_, schema) = ctx.require()?;
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table(schema)?))
        .bind(id)
        .execute(ctx.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}
