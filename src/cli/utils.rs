use anyhow::{anyhow, Context};
use reqwest::Method;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Server base URL, overridable for remote deployments and test harnesses.
pub fn base_url() -> String {
    std::env::var("CAMPUS_SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Bearer token for authenticated endpoints. Obtained via POST /auth/login.
pub fn auth_token() -> Option<String> {
    std::env::var("CAMPUS_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Issue a request against the API and decode the JSON body. Non-2xx
/// responses become errors carrying the server's error message.
pub async fn api_request(method: Method, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
    let url = format!("{}{}", base_url().trim_end_matches('/'), path);
    let client = reqwest::Client::new();

    let mut request = client.request(method, &url);
    if let Some(token) = auth_token() {
        request = request.bearer_auth(token);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status();
    let payload: Value = response.json().await.unwrap_or_else(|_| json!({}));

    if !status.is_success() {
        return Err(anyhow!("{} ({})", error_message(&payload), status));
    }

    Ok(payload)
}

/// The human-readable message from an error envelope
/// (`{"error": true, "message": ..., "code": ...}`).
fn error_message(payload: &Value) -> &str {
    payload
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("request failed")
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(obj), Some(extra)) = (response.as_object_mut(), data.as_ref().and_then(|d| d.as_object())) {
                obj.extend(extra.clone());
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: [] }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Pretty-print a raw JSON payload.
pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_reads_the_message_field() {
        let payload = json!({
            "error": true,
            "message": "Tenant not found: acme_school",
            "code": "NOT_FOUND"
        });
        assert_eq!(error_message(&payload), "Tenant not found: acme_school");
    }

    #[test]
    fn error_message_falls_back_on_foreign_bodies() {
        assert_eq!(error_message(&json!({})), "request failed");
        assert_eq!(error_message(&json!({ "error": true })), "request failed");
    }
}
