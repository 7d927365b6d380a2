use thiserror::Error;

/// Errors from the tenancy core: validation, provisioning and resolution.
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Invalid schema name: {0}")]
    InvalidSchemaName(String),

    #[error("Tenant already exists: {0}")]
    Duplicate(String),

    #[error("Provisioning failed for schema '{schema}': {source}")]
    Provisioning {
        schema: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Tenant not found: {0}")]
    NotFound(String),

    #[error("Tenant is suspended: {0}")]
    Suspended(String),

    #[error("Tenant context required but not resolved")]
    ContextMissing,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
