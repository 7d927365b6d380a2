use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub class_id: Option<String>,
    pub guardian: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StudentInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub class_id: Option<String>,
    pub guardian: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub class_id: Option<String>,
    pub guardian: Option<Value>,
}

fn table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.students"))
}

pub async fn list_students(ctx: &TenantContext) -> Result<Vec<Student>, ApiError> {
    let (_, schema) = ctx.require()?;
    let students = sqlx::query_as::<_, Student>(&format!(
        "SELECT * FROM {} ORDER BY created_at DESC",
        table(schema)?
    ))
    .fetch_all(ctx.pool())
    .await?;
    Ok(students)
}

pub async fn get_student(ctx: &TenantContext, id: Uuid) -> Result<Option<Student>, ApiError> {
    let (_, schema) = ctx.require()?;
    let student = sqlx::query_as::<_, Student>(&format!(
        "SELECT * FROM {} WHERE id = $1",
        table(schema)?
    ))
    .bind(id)
    .fetch_optional(ctx.pool())
    .await?;
    Ok(student)
}

pub async fn create_student(
    ctx: &TenantContext,
    input: StudentInput,
) -> Result<Student, ApiError> {
    let (_, schema) = ctx.require()?;
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(ApiError::bad_request("Student name is required"));
    }

    let student = sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO {} (first_name, last_name, email, class_id, guardian) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
        table(schema)?
    ))
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.class_id)
    .bind(input.guardian.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(ctx.pool())
    .await?;
    Ok(student)
}

pub async fn update_student(
    ctx: &TenantContext,
    id: Uuid,
    update: StudentUpdate,
) -> Result<Option<Student>, ApiError> {
    let (_, schema) = ctx.require()?;
    let student = sqlx::query_as::<_, Student>(&format!(
        "UPDATE {} SET \
             first_name = COALESCE($1, first_name), \
             last_name = COALESCE($2, last_name), \
             email = COALESCE($3, email), \
             class_id = COALESCE($4, class_id), \
             guardian = COALESCE($5, guardian), \
             updated_at = NOW() \
         WHERE id = $6 RETURNING *",
        table(schema)?
    ))
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.email)
    .bind(&update.class_id)
    .bind(&update.guardian)
    .bind(id)
    .fetch_optional(ctx.pool())
    .await?;
    Ok(student)
}

pub async fn delete_student(ctx: &TenantContext, id: Uuid) -> Result<bool, ApiError> {
    let (_, schema) = ctx.require()?;
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table(schema)?))
        .bind(id)
        .execute(ctx.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_is_schema_qualified() {
        assert_eq!(table("acme_school").unwrap(), "acme_school.students");
    }

    #[test]
    fn table_rejects_unvalidated_schema() {
        assert!(table("acme; DROP SCHEMA shared").is_err());
        assert!(table("public").is_err());
    }
}
