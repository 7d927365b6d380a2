pub mod auth;
pub mod rbac;
pub mod resolve_tenant;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use rbac::require_permission;
pub use resolve_tenant::{resolve_tenant_optional, resolve_tenant_required, TENANT_HEADER};
