use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::rbac::Role;
use crate::services::user_service::{self, TenantUser};
use crate::tenancy::TenantContext;

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: String,
}

/// GET /api/users - principals of the resolved tenant
pub async fn list(
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<TenantUser>>, ApiError> {
    let (tenant, _) = ctx.require()?;
    Ok(Json(
        user_service::list_tenant_users(ctx.pool(), tenant.id).await?,
    ))
}

/// PATCH /api/users/:id/role
pub async fn update_role(
    Extension(ctx): Extension<TenantContext>,
    Extension(principal): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<Json<TenantUser>, ApiError> {
    let (tenant, _) = ctx.require()?;

    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {}", payload.role)))?;

    let updated =
        user_service::update_user_role(ctx.pool(), tenant.id, user_id, role, principal.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found for tenant"))?;
    Ok(Json(updated))
}
