use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::rbac::Permission;

use super::auth::AuthUser;

/// Permission gate, layered per route group after JWT auth:
///
/// ```ignore
/// .layer(middleware::from_fn(move |req, next| {
///     require_permission(Permission::UsersManage, req, next)
/// }))
/// ```
pub async fn require_permission(
    permission: Permission,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !principal.role.can(permission) {
        return Err(ApiError::forbidden("Forbidden"));
    }

    Ok(next.run(request).await)
}
