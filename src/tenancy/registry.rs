use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::error::TenantError;

/// Lifecycle flag on a registry row. Stored as TEXT in `shared.tenants`;
/// mutated only by administrative flows, never by tenant-scoped requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
        }
    }
}

impl TryFrom<String> for TenantStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            other => Err(format!("unknown tenant status: {other}")),
        }
    }
}

/// One isolated school/organization. `schema_name` is immutable once
/// created; renaming it would orphan the tenant's data namespace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub schema_name: String,
    #[sqlx(try_from = "String")]
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TENANT_COLUMNS: &str = "id, name, schema_name, status, created_at, updated_at";

/// Typed access to `shared.tenants` — the one place that translates
/// external tenant hints (opaque strings) into registry rows.
#[derive(Clone)]
pub struct TenantRegistry {
    pool: PgPool,
}

impl TenantRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resolve an external hint: a registry UUID or a schema name.
    pub async fn find_by_identifier(&self, hint: &str) -> Result<Option<Tenant>, TenantError> {
        if let Ok(id) = hint.parse::<Uuid>() {
            return self.find_by_id(id).await;
        }
        self.find_by_schema(hint).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM shared.tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    pub async fn find_by_schema(&self, schema_name: &str) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM shared.tenants WHERE schema_name = $1"
        ))
        .bind(schema_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    pub async fn schema_exists(&self, schema_name: &str) -> Result<bool, TenantError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM shared.tenants WHERE schema_name = $1")
                .bind(schema_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }

    pub async fn list(&self) -> Result<Vec<Tenant>, TenantError> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM shared.tenants ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }

    /// Administrative status change (suspend/reactivate). The registry row
    /// survives suspension; only resolution is blocked.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: TenantStatus,
    ) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE shared.tenants SET status = $1, updated_at = NOW() \
             WHERE id = $2 RETURNING {TENANT_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    /// Rename the display name only; the schema name is immutable.
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE shared.tenants SET name = $1, updated_at = NOW() \
             WHERE id = $2 RETURNING {TENANT_COLUMNS}"
        ))
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }
}

/// Bootstrap the shared namespace: the tenant registry and the login
/// principals table. Principals live outside any tenant schema because
/// authentication has to succeed before a tenant schema is known.
/// Idempotent; runs at server startup.
pub async fn ensure_shared_schema(pool: &PgPool) -> Result<(), TenantError> {
    let statements = [
        "CREATE SCHEMA IF NOT EXISTS shared",
        r#"
        CREATE TABLE IF NOT EXISTS shared.tenants (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            schema_name TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS shared.users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tenant_id UUID REFERENCES shared.tenants(id),
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (tenant_id, email)
        )
        "#,
        // tenant_id IS NULL rows (superadmins) fall outside the UNIQUE
        // pair above, so enforce their email uniqueness separately
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS users_global_email_idx
            ON shared.users (email) WHERE tenant_id IS NULL
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
