use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicTerm {
    pub id: Uuid,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SchoolClass {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TermInput {
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ClassInput {
    pub name: String,
    pub description: Option<String>,
    pub metadata: Option<Value>,
}

fn terms_table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.academic_terms"))
}

fn classes_table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.classes"))
}

pub async fn create_term(ctx: &TenantContext, input: TermInput) -> Result<AcademicTerm, ApiError> {
    let (tenant, schema) = ctx.require()?;
    if input.ends_on < input.starts_on {
        return Err(ApiError::bad_request("Term must end after it starts"));
    }

    let term = sqlx::query_as::<_, AcademicTerm>(&format!(
        "INSERT INTO {} (name, starts_on, ends_on, metadata) \
         VALUES ($1, $2, $3, $4) RETURNING *",
        terms_table(schema)?
    ))
    .bind(&input.name)
    .bind(input.starts_on)
    .bind(input.ends_on)
    .bind(input.metadata.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(ctx.pool())
    .await?;

    info!(tenant = %tenant.schema_name, term_id = %term.id, "term saved: {}", term.name);
    Ok(term)
}

pub async fn list_terms(ctx: &TenantContext) -> Result<Vec<AcademicTerm>, ApiError> {
    let (_, schema) = ctx.require()?;
    let terms = sqlx::query_as::<_, AcademicTerm>(&format!(
        "SELECT * FROM {} ORDER BY starts_on DESC",
        terms_table(schema)?
    ))
    .fetch_all(ctx.pool())
    .await?;
    Ok(terms)
}

/// Upsert by class name: creating an existing class updates its
/// description and metadata instead.
pub async fn upsert_class(ctx: &TenantContext, input: ClassInput) -> Result<SchoolClass, ApiError> {
    let (tenant, schema) = ctx.require()?;
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("Class name is required"));
    }

    let class = sqlx::query_as::<_, SchoolClass>(&format!(
        "INSERT INTO {} (name, description, metadata) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (name) \
         DO UPDATE SET \
             description = EXCLUDED.description, \
             metadata = EXCLUDED.metadata, \
             updated_at = NOW() \
         RETURNING *",
        classes_table(schema)?
    ))
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.metadata.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(ctx.pool())
    .await?;

    info!(tenant = %tenant.schema_name, class_id = %class.id, "class saved: {}", class.name);
    Ok(class)
}

pub async fn list_classes(ctx: &TenantContext) -> Result<Vec<SchoolClass>, ApiError> {
    let (_, schema) = ctx.require()?;
    let classes = sqlx::query_as::<_, SchoolClass>(&format!(
        "SELECT * FROM {} ORDER BY name ASC",
        classes_table(schema)?
    ))
    .fetch_all(ctx.pool())
    .await?;
    Ok(classes)
}
