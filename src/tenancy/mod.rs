//! Tenant schema isolation: the validator, registry, provisioner and
//! per-request resolver behind the schema-per-tenant data layer.

pub mod error;
pub mod provisioner;
pub mod registry;
pub mod resolver;
pub mod schema_name;

pub use error::TenantError;
pub use provisioner::{create_tenant, CreateTenant};
pub use registry::{ensure_shared_schema, Tenant, TenantRegistry, TenantStatus};
pub use resolver::{resolve_tenant, TenantContext, TenantRequirement};
pub use schema_name::assert_valid_schema_name;
