use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::rbac::Role;
use crate::services::user_service;
use crate::tenancy::{TenantRegistry, TenantStatus};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Tenant hint: registry UUID or schema name
    pub tenant: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Absent for superadmin logins, which are not tenant-bound
    pub tenant: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: Value,
}

/// POST /auth/register - create a tenant-bound login principal
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let role = match payload.role.as_deref() {
        None => Role::Student,
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {}", raw)))?,
    };
    if role == Role::Superadmin {
        return Err(ApiError::forbidden("Superadmin accounts cannot self-register"));
    }

    let pool = Database::shared_pool().await?;
    let registry = TenantRegistry::new(pool.clone());
    let tenant = registry
        .find_by_identifier(&payload.tenant)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tenant not found: {}", payload.tenant)))?;
    if tenant.status != TenantStatus::Active {
        return Err(ApiError::forbidden(format!(
            "Tenant is suspended: {}",
            tenant.schema_name
        )));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal_server_error(format!("Password hashing failed: {}", e)))?;

    let user =
        user_service::create_user(&pool, Some(tenant.id), &payload.email, &password_hash, role)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "email": user.email,
            "role": user.role,
            "tenant_id": user.tenant_id,
            "is_verified": user.is_verified,
        })),
    ))
}

/// POST /auth/login - verify credentials and issue a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<TokenResponse>, ApiError> {
    let pool = Database::shared_pool().await?;

    let tenant_id = match payload.tenant.as_deref() {
        None => None,
        Some(hint) => {
            let registry = TenantRegistry::new(pool.clone());
            let tenant = registry
                .find_by_identifier(hint)
                .await?
                .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;
            if tenant.status != TenantStatus::Active {
                return Err(ApiError::forbidden(format!(
                    "Tenant is suspended: {}",
                    tenant.schema_name
                )));
            }
            Some(tenant.id)
        }
    };

    let user = user_service::find_by_email(&pool, &payload.email, tenant_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::internal_server_error(format!("Password check failed: {}", e)))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let role = user
        .role()
        .ok_or_else(|| ApiError::internal_server_error("User has an unknown role"))?;

    let claims = Claims::new(user.id, user.email.clone(), role, user.tenant_id);
    let token =
        generate_jwt(claims).map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(Json(TokenResponse {
        token,
        user: json!({
            "id": user.id,
            "email": user.email,
            "role": user.role,
            "tenant_id": user.tenant_id,
        }),
    }))
}

/// GET /api/auth/whoami - the authenticated principal
pub async fn whoami(Extension(principal): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "id": principal.user_id,
        "email": principal.email,
        "role": principal.role.as_str(),
        "tenant_id": principal.tenant_id,
    }))
}
