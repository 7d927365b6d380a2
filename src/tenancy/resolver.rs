use sqlx::PgPool;

use crate::middleware::auth::AuthUser;
use crate::rbac::Role;

use super::error::TenantError;
use super::registry::{Tenant, TenantRegistry, TenantStatus};
use super::schema_name::assert_valid_schema_name;

/// Whether a route can proceed without a resolved tenant. Tenant-agnostic
/// superadmin routes (e.g. the tenant listing) are `Optional`; everything
/// touching tenant data is `Required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantRequirement {
    Required,
    Optional,
}

/// Request-scoped tenant binding: the resolved tenant (if any) plus the
/// pool handle downstream services query through. Built once per request
/// and dropped at request end; never shared across requests.
#[derive(Clone, Debug)]
pub struct TenantContext {
    pub tenant: Option<Tenant>,
    pool: PgPool,
}

impl TenantContext {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.tenant.as_ref().map(|t| t.schema_name.as_str())
    }

    /// The tenant and its schema name, or `ContextMissing` for handlers on
    /// tenant-optional routes that do need a tenant after all.
    pub fn require(&self) -> Result<(&Tenant, &str), TenantError> {
        self.tenant
            .as_ref()
            .map(|t| (t, t.schema_name.as_str()))
            .ok_or(TenantError::ContextMissing)
    }
}

/// Pick the tenant hint a request may act on.
///
/// Principals bound to a tenant always resolve their own claim; any
/// client-supplied header is ignored so a forged header cannot point a
/// teacher at another tenant. Only the cross-tenant role (superadmin,
/// unbound) gets to choose a tenant via the `x-tenant-id` header.
pub fn select_tenant_hint(principal: &AuthUser, header_hint: Option<&str>) -> Option<String> {
    if let Some(tenant_id) = principal.tenant_id {
        return Some(tenant_id.to_string());
    }
    if principal.role == Role::Superadmin {
        return header_hint
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);
    }
    None
}

/// Resolve the tenant context for one request.
///
/// Resolution is synchronous and deterministic, so every failure is
/// terminal for the request; retrying with the same input would fail the
/// same way. The stored schema name is re-validated before use even though
/// it was validated at provisioning time.
pub async fn resolve_tenant(
    registry: &TenantRegistry,
    principal: &AuthUser,
    header_hint: Option<&str>,
    requirement: TenantRequirement,
) -> Result<TenantContext, TenantError> {
    let Some(hint) = select_tenant_hint(principal, header_hint) else {
        return match requirement {
            TenantRequirement::Optional => Ok(TenantContext {
                tenant: None,
                pool: registry.pool().clone(),
            }),
            TenantRequirement::Required => Err(TenantError::ContextMissing),
        };
    };

    let tenant = registry
        .find_by_identifier(&hint)
        .await?
        .ok_or_else(|| TenantError::NotFound(hint))?;

    if tenant.status != TenantStatus::Active {
        return Err(TenantError::Suspended(tenant.schema_name));
    }

    assert_valid_schema_name(&tenant.schema_name)?;

    Ok(TenantContext {
        tenant: Some(tenant),
        pool: registry.pool().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: Role, tenant_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "user@example.test".to_string(),
            role,
            tenant_id,
        }
    }

    fn lazy_registry() -> TenantRegistry {
        // connect_lazy never touches the network; only the no-hint paths
        // are exercised here
        let pool = PgPool::connect_lazy("postgres://localhost/campus_test")
            .expect("lazy pool");
        TenantRegistry::new(pool)
    }

    #[test]
    fn bound_role_ignores_forged_header() {
        let t1 = Uuid::new_v4();
        let user = principal(Role::Teacher, Some(t1));
        let hint = select_tenant_hint(&user, Some("some_other_tenant"));
        assert_eq!(hint, Some(t1.to_string()));
    }

    #[test]
    fn bound_superadmin_still_uses_claim() {
        let t1 = Uuid::new_v4();
        let user = principal(Role::Superadmin, Some(t1));
        let hint = select_tenant_hint(&user, Some("another"));
        assert_eq!(hint, Some(t1.to_string()));
    }

    #[test]
    fn unbound_superadmin_uses_header() {
        let user = principal(Role::Superadmin, None);
        assert_eq!(
            select_tenant_hint(&user, Some("acme_school")),
            Some("acme_school".to_string())
        );
        assert_eq!(select_tenant_hint(&user, Some("  ")), None);
        assert_eq!(select_tenant_hint(&user, None), None);
    }

    #[test]
    fn unbound_ordinary_role_gets_no_hint() {
        let user = principal(Role::Student, None);
        assert_eq!(select_tenant_hint(&user, Some("acme_school")), None);
    }

    #[tokio::test]
    async fn missing_hint_fails_required_routes() {
        let registry = lazy_registry();
        let user = principal(Role::Superadmin, None);
        let err = resolve_tenant(&registry, &user, None, TenantRequirement::Required)
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::ContextMissing));
    }

    #[tokio::test]
    async fn missing_hint_is_fine_on_optional_routes() {
        let registry = lazy_registry();
        let user = principal(Role::Superadmin, None);
        let ctx = resolve_tenant(&registry, &user, None, TenantRequirement::Optional)
            .await
            .unwrap();
        assert!(ctx.tenant.is_none());
        assert!(ctx.schema_name().is_none());
        assert!(matches!(ctx.require(), Err(TenantError::ContextMissing)));
        assert!(format!("{:?}", ctx).contains("tenant: None"));
    }
}
