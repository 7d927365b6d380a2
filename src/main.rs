use axum::{middleware, routing::get, Extension, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use campus_api::database::Database;
use campus_api::handlers;
use campus_api::middleware::{
    jwt_auth_middleware, require_permission, resolve_tenant_optional, resolve_tenant_required,
};
use campus_api::rbac::Permission;
use campus_api::tenancy::{ensure_shared_schema, TenantContext};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = campus_api::config::config();
    tracing::info!("Starting Campus API in {:?} mode", config.environment);

    // Bootstrap the shared registry tables so tenant provisioning works on a
    // fresh database. A missing database is logged but not fatal; /health
    // reports the degraded state.
    match Database::shared_pool().await {
        Ok(pool) => {
            if let Err(e) = ensure_shared_schema(&pool).await {
                tracing::error!("failed to bootstrap shared schema: {}", e);
            }
        }
        Err(e) => tracing::warn!("database unavailable at startup: {}", e),
    }

    let app = app();

    let port = config.api.port;
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Campus API server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server");

    Database::close().await;
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Authenticated session routes (no tenant context needed)
        .merge(session_routes())
        // Platform administration (tenant-optional)
        .merge(tenant_admin_routes())
        .merge(overview_routes())
        // Tenant-scoped API
        .merge(tenant_api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn session_routes() -> Router {
    use handlers::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

/// Tenant lifecycle management. Requires the tenants:manage permission
/// (superadmin only) and runs with an optional tenant context so the
/// endpoints work before any tenant is selected.
fn tenant_admin_routes() -> Router {
    use axum::routing::post;
    use handlers::tenants;

    Router::new()
        .route("/api/tenants", post(tenants::create).get(tenants::list))
        .route("/api/tenants/:id", get(tenants::show).patch(tenants::update))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::TenantsManage, req, next)
        }))
        .layer(middleware::from_fn(resolve_tenant_optional))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

/// Cross-tenant overview for platform staff. Tenant context is optional:
/// a superadmin may pass x-tenant-id to focus on one tenant, or omit it.
fn overview_routes() -> Router {
    Router::new()
        .route("/api/admin/overview", get(admin_overview))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::UsersManage, req, next)
        }))
        .layer(middleware::from_fn(resolve_tenant_optional))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

/// All routes that operate on a single tenant's schema. Each permission
/// group carries its own RBAC layer; tenant resolution and JWT auth wrap
/// the merged router so every request below has a TenantContext.
fn tenant_api_routes() -> Router {
    Router::new()
        .merge(student_routes())
        .merge(teacher_routes())
        .merge(configuration_routes())
        .merge(attendance_manage_routes())
        .merge(attendance_view_routes())
        .merge(exam_manage_routes())
        .merge(exam_view_routes())
        .merge(fee_manage_routes())
        .merge(fee_view_routes())
        .merge(report_routes())
        .merge(user_routes())
        .layer(middleware::from_fn(resolve_tenant_required))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

fn student_routes() -> Router {
    use axum::routing::post;
    use handlers::students;

    Router::new()
        .route("/api/students", post(students::create).get(students::list))
        .route(
            "/api/students/:id",
            get(students::show)
                .patch(students::update)
                .delete(students::delete),
        )
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::UsersManage, req, next)
        }))
}

fn teacher_routes() -> Router {
    use axum::routing::post;
    use handlers::teachers;

    Router::new()
        .route("/api/teachers", post(teachers::create).get(teachers::list))
        .route(
            "/api/teachers/:id",
            get(teachers::show)
                .patch(teachers::update)
                .delete(teachers::delete),
        )
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::UsersManage, req, next)
        }))
}

/// School profile, branding, academic terms and classes.
fn configuration_routes() -> Router {
    use handlers::{branding, school, terms};

    Router::new()
        .route("/api/school", get(school::show).put(school::upsert))
        .route("/api/branding", get(branding::show).put(branding::upsert))
        .route("/api/terms", get(terms::list_terms).post(terms::create_term))
        .route("/api/classes", get(terms::list_classes).post(terms::upsert_class))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::SettingsBranding, req, next)
        }))
}

fn attendance_manage_routes() -> Router {
    use axum::routing::post;
    use handlers::attendance;

    Router::new()
        .route("/api/attendance", post(attendance::mark))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::AttendanceManage, req, next)
        }))
}

fn attendance_view_routes() -> Router {
    use handlers::attendance;

    Router::new()
        .route("/api/attendance/student/:id", get(attendance::student_history))
        .route(
            "/api/attendance/student/:id/summary",
            get(attendance::student_summary),
        )
        .route("/api/attendance/class/:class_id", get(attendance::class_report))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::AttendanceView, req, next)
        }))
}

fn exam_manage_routes() -> Router {
    use axum::routing::post;
    use handlers::exams;

    Router::new()
        .route("/api/exams", post(exams::create))
        .route("/api/exams/:id/grades", post(exams::record_grades))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::ExamsManage, req, next)
        }))
}

fn exam_view_routes() -> Router {
    use handlers::exams;

    Router::new()
        .route("/api/exams", get(exams::list))
        .route("/api/exams/results/student/:id", get(exams::student_results))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::ExamsView, req, next)
        }))
}

fn fee_manage_routes() -> Router {
    use axum::routing::post;
    use handlers::invoices;

    Router::new()
        .route("/api/invoices", post(invoices::create))
        .route("/api/invoices/:id/payments", post(invoices::record_payment))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::FeesManage, req, next)
        }))
}

fn fee_view_routes() -> Router {
    use handlers::invoices;

    Router::new()
        .route("/api/invoices", get(invoices::list))
        .route("/api/invoices/:id", get(invoices::show))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::FeesView, req, next)
        }))
}

fn report_routes() -> Router {
    use handlers::reports;

    Router::new()
        .route("/api/reports/attendance", get(reports::attendance))
        .route("/api/reports/grades/:exam_id", get(reports::grades))
        .route("/api/reports/fees", get(reports::fees))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::UsersManage, req, next)
        }))
}

fn user_routes() -> Router {
    use axum::routing::patch;
    use handlers::users;

    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/:id/role", patch(users::update_role))
        .layer(middleware::from_fn(|req, next| {
            require_permission(Permission::UsersManage, req, next)
        }))
}

async fn admin_overview(Extension(ctx): Extension<TenantContext>) -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "tenant_in_view": ctx.tenant.as_ref().map(|t| json!({
                "id": t.id,
                "name": t.name,
                "schema_name": t.schema_name,
                "status": t.status,
            })),
        }
    }))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Campus API",
            "version": version,
            "description": "Multi-tenant school management backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "session": "/api/auth/whoami (protected)",
                "tenants": "/api/tenants[/:id] (superadmin)",
                "students": "/api/students[/:id] (protected, tenant-scoped)",
                "teachers": "/api/teachers[/:id] (protected, tenant-scoped)",
                "attendance": "/api/attendance/* (protected, tenant-scoped)",
                "exams": "/api/exams/* (protected, tenant-scoped)",
                "invoices": "/api/invoices/* (protected, tenant-scoped)",
                "reports": "/api/reports/* (protected, tenant-scoped)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
