use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::branding_service::{self, Branding, BrandingInput};
use crate::tenancy::TenantContext;

pub async fn show(Extension(ctx): Extension<TenantContext>) -> Result<Json<Value>, ApiError> {
    match branding_service::get_branding(&ctx).await? {
        Some(branding) => Ok(Json(serde_json::to_value(branding).map_err(|e| {
            ApiError::internal_server_error(format!("Failed to serialize branding: {}", e))
        })?)),
        None => Ok(Json(json!(null))),
    }
}

pub async fn upsert(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<BrandingInput>,
) -> Result<Json<Branding>, ApiError> {
    Ok(Json(branding_service::upsert_branding(&ctx, payload).await?))
}
