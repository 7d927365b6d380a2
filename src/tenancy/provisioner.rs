use tracing::{error, info};

use super::error::TenantError;
use super::registry::{Tenant, TenantRegistry};
use super::schema_name::{assert_valid_schema_name, derive_schema_name, quote_identifier};

/// Provisioning input. When `schema_name` is omitted it is derived from
/// the display name.
#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub name: String,
    pub schema_name: Option<String>,
}

/// Every table a tenant's data services expect to find in its namespace.
/// The provisioner creates all of them; a registry row therefore implies
/// the full table set exists.
pub const TENANT_TABLES: &[&str] = &[
    "schools",
    "students",
    "teachers",
    "classes",
    "academic_terms",
    "attendance_records",
    "exams",
    "grades",
    "fee_invoices",
    "payments",
    "branding_settings",
];

/// Atomically create a tenant: physical namespace, baseline tables and
/// registry row in one transaction. Postgres DDL is transactional, so a
/// failure at any step rolls back both the schema and the row — the
/// resolver can never observe a half-provisioned tenant.
pub async fn create_tenant(
    registry: &TenantRegistry,
    input: CreateTenant,
) -> Result<Tenant, TenantError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(TenantError::InvalidSchemaName(input.name));
    }

    let schema = match input.schema_name {
        Some(explicit) => assert_valid_schema_name(&explicit)?.to_string(),
        None => {
            // Pre-load existing names so derivation can pick a free slug
            let existing: Vec<String> = registry
                .list()
                .await?
                .into_iter()
                .map(|t| t.schema_name)
                .collect();
            derive_schema_name(name, |candidate| existing.iter().any(|s| s == candidate))?
        }
    };

    // Fail fast on re-provisioning; the UNIQUE constraint below is the
    // authoritative check under concurrency
    if registry.schema_exists(&schema).await? {
        return Err(TenantError::Duplicate(schema));
    }

    let mut tx = registry.pool().begin().await?;

    let create_schema = format!("CREATE SCHEMA {}", quote_identifier(&schema));
    sqlx::query(&create_schema)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify_ddl_error(&schema, e))?;

    for statement in tenant_table_ddl(&schema) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify_ddl_error(&schema, e))?;
    }

    let tenant = sqlx::query_as::<_, Tenant>(
        "INSERT INTO shared.tenants (name, schema_name, status) \
         VALUES ($1, $2, 'active') \
         RETURNING id, name, schema_name, status, created_at, updated_at",
    )
    .bind(name)
    .bind(&schema)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| classify_ddl_error(&schema, e))?;

    tx.commit()
        .await
        .map_err(|e| classify_ddl_error(&schema, e))?;

    info!(
        tenant_id = %tenant.id,
        schema = %tenant.schema_name,
        "provisioned tenant '{}'",
        tenant.name
    );
    Ok(tenant)
}

/// Map low-level failures during provisioning. Uniqueness violations on
/// the registry (the serialization point for concurrent provisioning) and
/// an already-existing schema both mean the tenant exists; everything else
/// is a provisioning failure, logged with the attempted schema name.
fn classify_ddl_error(schema: &str, err: sqlx::Error) -> TenantError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            // unique_violation, duplicate_schema
            Some("23505") | Some("42P06") => {
                return TenantError::Duplicate(schema.to_string());
            }
            _ => {}
        }
    }
    error!(schema = %schema, error = %err, "tenant provisioning failed, rolling back");
    TenantError::Provisioning {
        schema: schema.to_string(),
        source: err,
    }
}

/// DDL for the full per-tenant table set. The schema name must already be
/// validated by the caller; it is quoted regardless.
pub fn tenant_table_ddl(schema: &str) -> Vec<String> {
    let s = quote_identifier(schema);
    vec![
        format!(
            r#"
            CREATE TABLE {s}.schools (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL,
                address JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.students (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT,
                class_id TEXT,
                guardian JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.teachers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL,
                email TEXT,
                subjects TEXT[] NOT NULL DEFAULT '{{}}',
                assigned_classes TEXT[] NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.classes (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                metadata JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.academic_terms (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL,
                starts_on DATE NOT NULL,
                ends_on DATE NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.attendance_records (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                student_id UUID NOT NULL,
                class_id TEXT,
                status TEXT NOT NULL,
                marked_by UUID NOT NULL,
                attendance_date DATE NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}',
                recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (student_id, class_id, attendance_date)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.exams (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL,
                subject TEXT,
                class_id TEXT,
                held_on DATE,
                metadata JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.grades (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                exam_id UUID NOT NULL,
                student_id UUID NOT NULL,
                subject TEXT NOT NULL,
                score DOUBLE PRECISION,
                grade TEXT,
                metadata JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (exam_id, student_id, subject)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.fee_invoices (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                student_id UUID NOT NULL,
                amount NUMERIC(12, 2) NOT NULL,
                currency TEXT NOT NULL DEFAULT 'USD',
                due_date DATE,
                status TEXT NOT NULL DEFAULT 'pending',
                metadata JSONB NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.payments (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                invoice_id UUID NOT NULL,
                amount NUMERIC(12, 2) NOT NULL,
                status TEXT NOT NULL DEFAULT 'succeeded',
                paid_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                metadata JSONB NOT NULL DEFAULT '{{}}'
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE {s}.branding_settings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                logo_url TEXT,
                primary_color TEXT,
                secondary_color TEXT,
                theme_flags JSONB NOT NULL DEFAULT '{{}}',
                typography JSONB NOT NULL DEFAULT '{{}}',
                navigation JSONB NOT NULL DEFAULT '{{}}',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_covers_every_required_table() {
        let ddl = tenant_table_ddl("acme_school");
        assert_eq!(ddl.len(), TENANT_TABLES.len());
        for table in TENANT_TABLES {
            assert!(
                ddl.iter()
                    .any(|stmt| stmt.contains(&format!("\"acme_school\".{}", table))),
                "missing DDL for table {}",
                table
            );
        }
    }

    #[test]
    fn ddl_quotes_the_schema() {
        for stmt in tenant_table_ddl("acme_school") {
            assert!(stmt.contains("\"acme_school\"."));
        }
    }
}
