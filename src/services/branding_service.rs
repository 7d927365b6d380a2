use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branding {
    pub id: Uuid,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub theme_flags: Value,
    pub typography: Value,
    pub navigation: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BrandingInput {
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub theme_flags: Option<Value>,
    pub typography: Option<Value>,
    pub navigation: Option<Value>,
}

fn table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.branding_settings"))
}

pub async fn get_branding(ctx: &TenantContext) -> Result<Option<Branding>, ApiError> {
    let (_, schema) = ctx.require()?;
    let branding = sqlx::query_as::<_, Branding>(&format!(
        "SELECT * FROM {} ORDER BY updated_at DESC LIMIT 1",
        table(schema)?
    ))
    .fetch_optional(ctx.pool())
    .await?;
    Ok(branding)
}

/// A tenant has at most one branding row; the first write creates it and
/// later writes patch it.
pub async fn upsert_branding(
    ctx: &TenantContext,
    input: BrandingInput,
) -> Result<Branding, ApiError> {
    let (_, schema) = ctx.require()?;
    let existing = get_branding(ctx).await?;

    let branding = match existing {
        None => {
            sqlx::query_as::<_, Branding>(&format!(
                "INSERT INTO {} (logo_url, primary_color, secondary_color, theme_flags, typography, navigation) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
                table(schema)?
            ))
            .bind(&input.logo_url)
            .bind(&input.primary_color)
            .bind(&input.secondary_color)
            .bind(input.theme_flags.unwrap_or_else(|| Value::Object(Default::default())))
            .bind(input.typography.unwrap_or_else(|| Value::Object(Default::default())))
            .bind(input.navigation.unwrap_or_else(|| Value::Object(Default::default())))
            .fetch_one(ctx.pool())
            .await?
        }
        Some(current) => {
            sqlx::query_as::<_, Branding>(&format!(
                "UPDATE {} SET \
                     logo_url = COALESCE($1, logo_url), \
                     primary_color = COALESCE($2, primary_color), \
                     secondary_color = COALESCE($3, secondary_color), \
                     theme_flags = COALESCE($4, theme_flags), \
                     typography = COALESCE($5, typography), \
                     navigation = COALESCE($6, navigation), \
                     updated_at = NOW() \
                 WHERE id = $7 RETURNING *",
                table(schema)?
            ))
            .bind(&input.logo_url)
            .bind(&input.primary_color)
            .bind(&input.secondary_color)
            .bind(&input.theme_flags)
            .bind(&input.typography)
            .bind(&input.navigation)
            .bind(current.id)
            .fetch_one(ctx.pool())
            .await?
        }
    };

    Ok(branding)
}
