mod common;

use anyhow::Result;
use campus_api::rbac::Role;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn unique_schema() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("t_{}", &suffix[..12])
}

#[tokio::test]
async fn provision_and_resolve_round_trip() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::superadmin_token()?;

    let name = common::unique_tenant_name("Provision Test");
    let res = client
        .post(format!("{}/api/tenants", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED, "create failed");
    let tenant = res.json::<serde_json::Value>().await?;

    let schema = tenant["schema_name"].as_str().unwrap_or_default().to_string();
    assert!(
        schema.starts_with("provision_test_"),
        "unexpected derived schema: {}",
        schema
    );
    assert_eq!(tenant["status"], "active");

    // A superadmin can put the new tenant in view via the header
    let res = client
        .get(format!("{}/api/admin/overview", server.base_url))
        .bearer_auth(&token)
        .header("x-tenant-id", &schema)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["tenant_in_view"]["id"], tenant["id"]);

    // Without the header there is simply no tenant in view
    let res = client
        .get(format!("{}/api/admin/overview", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"]["tenant_in_view"].is_null());

    Ok(())
}

#[tokio::test]
async fn invalid_schema_names_are_rejected() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::superadmin_token()?;

    for schema in ["Bad-Name", "1starts_with_digit", "public", "pg_catalog", "shared"] {
        let res = client
            .post(format!("{}/api/tenants", server.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "name": common::unique_tenant_name("Invalid Schema"),
                "schema_name": schema,
            }))
            .send()
            .await?;

        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "schema '{}' should be rejected",
            schema
        );
    }

    Ok(())
}

#[tokio::test]
async fn duplicate_schema_conflicts() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::superadmin_token()?;
    let schema = unique_schema();

    let res = client
        .post(format!("{}/api/tenants", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": common::unique_tenant_name("Duplicate A"),
            "schema_name": schema,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/tenants", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": common::unique_tenant_name("Duplicate B"),
            "schema_name": schema,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn concurrent_duplicates_yield_one_success() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::superadmin_token()?;
    let schema = unique_schema();

    let post = |name: String| {
        let client = client.clone();
        let token = token.clone();
        let schema = schema.clone();
        let url = format!("{}/api/tenants", server.base_url);
        async move {
            client
                .post(url)
                .bearer_auth(token)
                .json(&json!({ "name": name, "schema_name": schema }))
                .send()
                .await
        }
    };

    // Race two provisioning calls for the same schema; the UNIQUE
    // constraint on shared.tenants serializes them
    let (a, b) = tokio::join!(
        post(common::unique_tenant_name("Race A")),
        post(common::unique_tenant_name("Race B")),
    );
    let mut statuses = [a?.status(), b?.status()];
    statuses.sort();

    assert_eq!(
        statuses,
        [StatusCode::CREATED, StatusCode::CONFLICT],
        "expected exactly one success and one conflict"
    );

    Ok(())
}

#[tokio::test]
async fn failed_provisioning_leaves_no_registry_row() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::superadmin_token()?;

    // Occupy the physical namespace without a registry row
    let pool = sqlx::postgres::PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
    let schema = unique_schema();
    sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema))
        .execute(&pool)
        .await?;

    let res = client
        .post(format!("{}/api/tenants", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": common::unique_tenant_name("Orphan Schema"),
            "schema_name": schema,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The transaction rolled back: the registry never gained a row
    let count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM shared.tenants WHERE schema_name = $1")
            .bind(&schema)
            .fetch_one(&pool)
            .await?;
    assert_eq!(count, 0);

    sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", schema))
        .execute(&pool)
        .await?;

    Ok(())
}

#[tokio::test]
async fn suspended_tenant_is_blocked() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let superadmin = common::superadmin_token()?;

    let res = client
        .post(format!("{}/api/tenants", server.base_url))
        .bearer_auth(&superadmin)
        .json(&json!({ "name": common::unique_tenant_name("Suspension Test") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let tenant = res.json::<serde_json::Value>().await?;
    let tenant_id: Uuid = tenant["id"].as_str().unwrap_or_default().parse()?;

    // Tenant-bound admin can reach tenant data while active
    let admin = common::token_for(Role::Admin, Some(tenant_id))?;
    let res = client
        .get(format!("{}/api/students", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Tenant-bound admins cannot manage the registry
    let res = client
        .get(format!("{}/api/tenants", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Suspend: every tenant-scoped request now fails with 403
    let res = client
        .patch(format!("{}/api/tenants/{}", server.base_url, tenant_id))
        .bearer_auth(&superadmin)
        .json(&json!({ "status": "suspended" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/students", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Reactivate restores access
    let res = client
        .patch(format!("{}/api/tenants/{}", server.base_url, tenant_id))
        .bearer_auth(&superadmin)
        .json(&json!({ "status": "active" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/students", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn header_cannot_override_bound_tenant() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let superadmin = common::superadmin_token()?;

    let mut ids = Vec::new();
    for prefix in ["Bound Tenant", "Other Tenant"] {
        let res = client
            .post(format!("{}/api/tenants", server.base_url))
            .bearer_auth(&superadmin)
            .json(&json!({ "name": common::unique_tenant_name(prefix) }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let tenant = res.json::<serde_json::Value>().await?;
        ids.push(tenant["id"].as_str().unwrap_or_default().to_string());
    }

    let bound: Uuid = ids[0].parse()?;

    // The claim wins; the header pointing at another tenant is ignored
    let admin = common::token_for(Role::Admin, Some(bound))?;
    let res = client
        .get(format!("{}/api/admin/overview", server.base_url))
        .bearer_auth(&admin)
        .header("x-tenant-id", &ids[1])
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["tenant_in_view"]["id"], ids[0].as_str());

    Ok(())
}
