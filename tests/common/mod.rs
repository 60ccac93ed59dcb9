#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

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

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_measurement-api"));
        cmd.env("MEASURE_API_PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("SECURITY_BCRYPT_COST", "4")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if std::env::var("JWT_SECRET").is_err() {
            cmd.env("JWT_SECRET", "integration-test-secret");
        }

        // Inherit environment so the server sees DATABASE_URL
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
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
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// The shared server, or `None` when no database is configured.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Register a fresh user and return a bearer token for it.
pub async fn login_new_user(server: &TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let creds = json!({ "username": unique("user"), "password": "secret" });

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&creds)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let body: Value = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&creds)
        .send()
        .await?
        .json()
        .await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response without token")
}

/// Create a series and return its id.
pub async fn create_series(server: &TestServer, token: &str, min: f64, max: f64) -> Result<i64> {
    let body: Value = reqwest::Client::new()
        .post(format!("{}/api/series", server.base_url))
        .bearer_auth(token)
        .json(&json!({ "name": unique("series"), "min_value": min, "max_value": max }))
        .send()
        .await?
        .json()
        .await?;
    body["id"].as_i64().context("series response without id")
}
