use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::Database;
use crate::error::ApiError;
use crate::tenancy::{self, CreateTenant, Tenant, TenantContext, TenantRegistry, TenantStatus};

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub schema_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub status: Option<TenantStatus>,
}

async fn registry() -> Result<TenantRegistry, ApiError> {
    Ok(TenantRegistry::new(Database::shared_pool().await?))
}

/// POST /api/tenants - provision a new tenant (namespace + registry row)
pub async fn create(
    Json(payload): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Tenant name is required"));
    }

    let registry = registry().await?;
    let tenant = tenancy::create_tenant(
        &registry,
        CreateTenant {
            name: payload.name,
            schema_name: payload.schema_name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

/// GET /api/tenants - tenant-agnostic listing; works with or without a
/// tenant in view
pub async fn list(
    Extension(_ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    let registry = registry().await?;
    Ok(Json(registry.list().await?))
}

/// GET /api/tenants/:id
pub async fn show(Path(id): Path<Uuid>) -> Result<Json<Tenant>, ApiError> {
    let registry = registry().await?;
    let tenant = registry
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tenant not found: {}", id)))?;
    Ok(Json(tenant))
}

/// PATCH /api/tenants/:id - rename and/or change lifecycle status. The
/// schema name is immutable; changing it would orphan the tenant's data.
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTenantRequest>,
) -> Result<Json<Tenant>, ApiError> {
    let registry = registry().await?;

    let mut tenant = registry
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tenant not found: {}", id)))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Tenant name cannot be empty"));
        }
        tenant = registry
            .rename(id, name.trim())
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Tenant not found: {}", id)))?;
    }

    if let Some(status) = payload.status {
        tenant = registry
            .set_status(id, status)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Tenant not found: {}", id)))?;
    }

    Ok(Json(tenant))
}
