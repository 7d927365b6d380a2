use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Provision a new tenant (registry row plus dedicated schema)")]
    Create {
        #[arg(help = "Tenant display name")]
        name: String,

        #[arg(long, help = "Explicit schema name (derived from the name when omitted)")]
        schema: Option<String>,
    },

    #[command(about = "List all tenants")]
    List,

    #[command(about = "Show tenant information")]
    Show {
        #[arg(help = "Tenant ID or schema name")]
        tenant: String,
    },

    #[command(about = "Suspend a tenant; its users get 403 until reactivated")]
    Suspend {
        #[arg(help = "Tenant ID or schema name")]
        tenant: String,
    },

    #[command(about = "Reactivate a suspended tenant")]
    Activate {
        #[arg(help = "Tenant ID or schema name")]
        tenant: String,
    },
}

/// Look up a tenant by UUID or schema name and return its JSON record.
async fn fetch_tenant(identifier: &str) -> anyhow::Result<Value> {
    if Uuid::parse_str(identifier).is_ok() {
        return api_request(Method::GET, &format!("/api/tenants/{}", identifier), None).await;
    }

    let tenants = api_request(Method::GET, "/api/tenants", None).await?;
    tenants
        .as_array()
        .and_then(|list| {
            list.iter()
                .find(|t| t.get("schema_name").and_then(|s| s.as_str()) == Some(identifier))
                .cloned()
        })
        .ok_or_else(|| anyhow::anyhow!("Tenant '{}' not found", identifier))
}

fn field<'a>(tenant: &'a Value, key: &str) -> &'a str {
    tenant.get(key).and_then(|v| v.as_str()).unwrap_or("-")
}

async fn set_status(
    tenant: &str,
    status: &str,
    verb: &str,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let record = fetch_tenant(tenant).await?;
    let id = field(&record, "id").to_string();

    let updated = api_request(
        Method::PATCH,
        &format!("/api/tenants/{}", id),
        Some(json!({ "status": status })),
    )
    .await?;

    output_success(
        output_format,
        &format!("Tenant '{}' {}", field(&updated, "name"), verb),
        Some(json!({ "tenant": updated })),
    )
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Create { name, schema } => {
            let tenant = api_request(
                Method::POST,
                "/api/tenants",
                Some(json!({ "name": name, "schema_name": schema })),
            )
            .await?;

            output_success(
                &output_format,
                &format!(
                    "Tenant '{}' provisioned with schema '{}'",
                    field(&tenant, "name"),
                    field(&tenant, "schema_name")
                ),
                Some(json!({ "tenant": tenant })),
            )
        }
        TenantCommands::List => {
            let tenants = api_request(Method::GET, "/api/tenants", None).await?;
            let list = tenants.as_array().cloned().unwrap_or_default();

            if list.is_empty() {
                return output_empty_collection(&output_format, "tenants", "No tenants provisioned");
            }

            match output_format {
                OutputFormat::Json => print_json(&json!({ "tenants": list })),
                OutputFormat::Text => {
                    println!(
                        "{:<38} {:<25} {:<20} {}",
                        "ID", "NAME", "SCHEMA", "STATUS"
                    );
                    println!("{}", "-".repeat(95));

                    for tenant in &list {
                        println!(
                            "{:<38} {:<25} {:<20} {}",
                            field(tenant, "id"),
                            field(tenant, "name"),
                            field(tenant, "schema_name"),
                            field(tenant, "status")
                        );
                    }
                    Ok(())
                }
            }
        }
        TenantCommands::Show { tenant } => {
            let record = fetch_tenant(&tenant).await?;

            match output_format {
                OutputFormat::Json => print_json(&record),
                OutputFormat::Text => {
                    println!("Tenant: {}", field(&record, "name"));
                    println!("ID: {}", field(&record, "id"));
                    println!("Schema: {}", field(&record, "schema_name"));
                    println!("Status: {}", field(&record, "status"));
                    println!("Created: {}", field(&record, "created_at"));
                    Ok(())
                }
            }
        }
        TenantCommands::Suspend { tenant } => {
            set_status(&tenant, "suspended", "suspended", &output_format).await
        }
        TenantCommands::Activate { tenant } => {
            set_status(&tenant, "active", "activated", &output_format).await
        }
    }
}
