use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub address: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SchoolInput {
    pub name: String,
    pub address: Option<Value>,
}

fn table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.schools"))
}

pub async fn get_school(ctx: &TenantContext) -> Result<Option<School>, ApiError> {
    let (_, schema) = ctx.require()?;
    let school = sqlx::query_as::<_, School>(&format!(
        "SELECT * FROM {} ORDER BY created_at ASC LIMIT 1",
        table(schema)?
    ))
    .fetch_optional(ctx.pool())
    .await?;
    Ok(school)
}

pub async fn upsert_school(ctx: &TenantContext, input: SchoolInput) -> Result<School, ApiError> {
    let (_, schema) = ctx.require()?;
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("School name is required"));
    }

    let existing = get_school(ctx).await?;

    let school = match existing {
        None => {
            sqlx::query_as::<_, School>(&format!(
                "INSERT INTO {} (name, address) VALUES ($1, $2) RETURNING *",
                table(schema)?
            ))
            .bind(&input.name)
            .bind(input.address.unwrap_or_else(|| Value::Object(Default::default())))
            .fetch_one(ctx.pool())
            .await?
        }
        Some(current) => {
            sqlx::query_as::<_, School>(&format!(
                "UPDATE {} SET name = $1, address = COALESCE($2, address), updated_at = NOW() \
                 WHERE id = $3 RETURNING *",
                table(schema)?
            ))
            .bind(&input.name)
            .bind(&input.address)
            .bind(current.id)
            .fetch_one(ctx.pool())
            .await?
        }
    };

    Ok(school)
}
