use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::rbac::Role;

/// A login principal from `shared.users`. Principals live in the shared
/// namespace, not inside any tenant schema, because authentication has to
/// succeed before a tenant schema is known.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantUser {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl TenantUser {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

pub async fn list_tenant_users(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<TenantUser>, ApiError> {
    let users = sqlx::query_as::<_, TenantUser>(
        "SELECT * FROM shared.users WHERE tenant_id = $1 ORDER BY created_at DESC",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
    tenant_id: Option<Uuid>,
) -> Result<Option<TenantUser>, ApiError> {
    let user = sqlx::query_as::<_, TenantUser>(
        "SELECT * FROM shared.users \
         WHERE email = $1 \
           AND (($2::uuid IS NULL AND tenant_id IS NULL) OR tenant_id = $2::uuid)",
    )
    .bind(email)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create_user(
    pool: &PgPool,
    tenant_id: Option<Uuid>,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<TenantUser, ApiError> {
    let user = sqlx::query_as::<_, TenantUser>(
        "INSERT INTO shared.users (tenant_id, email, password_hash, role) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(tenant_id)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            ApiError::conflict(format!("User already exists: {}", email))
        }
        _ => e.into(),
    })?;
    Ok(user)
}

pub async fn update_user_role(
    pool: &PgPool,
    tenant_id: Uuid,
    user_id: Uuid,
    role: Role,
    actor_id: Uuid,
) -> Result<Option<TenantUser>, ApiError> {
    // Role changes stay inside the tenant; superadmin is never assignable
    // through a tenant-scoped route
    if role == Role::Superadmin {
        return Err(ApiError::forbidden("Cannot assign the superadmin role"));
    }

    let user = sqlx::query_as::<_, TenantUser>(
        "UPDATE shared.users SET role = $1 \
         WHERE id = $2 AND tenant_id = $3 RETURNING *",
    )
    .bind(role.as_str())
    .bind(user_id)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;

    if let Some(updated) = &user {
        info!(
            tenant_id = %tenant_id,
            user_id = %updated.id,
            new_role = %updated.role,
            actor_id = %actor_id,
            "user role updated"
        );
    }
    Ok(user)
}
