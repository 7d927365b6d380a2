use axum::{extract::Request, middleware::Next, response::Response};

use crate::database::Database;
use crate::error::ApiError;
use crate::tenancy::{self, TenantRegistry, TenantRequirement};

use super::auth::AuthUser;

/// Header carrying an explicit tenant hint. Honored only for the
/// cross-tenant superadmin role; the resolver ignores it for everyone else.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Middleware that resolves the request's tenant context and injects it as
/// an extension. Runs after JWT authentication. Routes that must act on a
/// tenant use the `Required` variant; tenant-agnostic superadmin routes use
/// `Optional` and check the context themselves.
pub async fn resolve_tenant_required(request: Request, next: Next) -> Result<Response, ApiError> {
    resolve(request, next, TenantRequirement::Required).await
}

pub async fn resolve_tenant_optional(request: Request, next: Next) -> Result<Response, ApiError> {
    resolve(request, next, TenantRequirement::Optional).await
}

async fn resolve(
    mut request: Request,
    next: Next,
    requirement: TenantRequirement,
) -> Result<Response, ApiError> {
    // Resolver misconfiguration, not a client error: auth must run first
    let principal = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| {
            ApiError::internal_server_error("Tenant resolution requires authentication middleware")
        })?
        .clone();

    let header_hint = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let pool = Database::shared_pool().await?;
    let registry = TenantRegistry::new(pool);

    let context = tenancy::resolve_tenant(
        &registry,
        &principal,
        header_hint.as_deref(),
        requirement,
    )
    .await?;

    if let Some(schema) = context.schema_name() {
        tracing::debug!(schema = %schema, user = %principal.email, "tenant context resolved");
    }

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
