#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use uuid::Uuid;

use campus_api::auth::{generate_jwt, Claims};
use campus_api::rbac::Role;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/campus-api");
        cmd.env("CAMPUS_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Consider server ready on any non-404 response
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// True when a database is configured; tests that provision tenants or
/// touch the registry bail out early without one.
pub fn db_available() -> bool {
    std::env::var("DATABASE_URL").map(|v| !v.is_empty()).unwrap_or(false)
}

/// Mint a token the same way the server does. The test process and the
/// spawned server share the environment, so the secrets agree.
pub fn token_for(role: Role, tenant_id: Option<Uuid>) -> Result<String> {
    let claims = Claims::new(
        Uuid::new_v4(),
        format!("{}@test.local", role.as_str()),
        role,
        tenant_id,
    );
    generate_jwt(claims).context("failed to mint test token")
}

pub fn superadmin_token() -> Result<String> {
    token_for(Role::Superadmin, None)
}

/// Unique tenant display name so repeated test runs never collide.
pub fn unique_tenant_name(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{} {}", prefix, &suffix[..12])
}
