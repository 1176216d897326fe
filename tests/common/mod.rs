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

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/devassets-api");
        cmd.env("DEVASSETS_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and REDIS_URL from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// These tests drive a real server against a real database; they skip
/// themselves when no DATABASE_URL is exported.
pub fn database_configured() -> bool {
    std::env::var("DATABASE_URL").map(|v| !v.is_empty()).unwrap_or(false)
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique suffix so repeated runs never trip unique constraints.
pub fn unique() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

/// POST a payload and return the `data` object out of the response envelope.
pub async fn post_created(url: &str, payload: &Value) -> Result<Value> {
    let client = reqwest::Client::new();
    let res = client.post(url).json(payload).send().await?;
    let status = res.status();
    let body = res.json::<Value>().await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "expected 201 from {}, got {}: {}",
        url,
        status,
        body
    );
    body.get("data")
        .cloned()
        .context("response envelope missing data")
}

pub async fn create_department(base_url: &str, name: &str) -> Result<i64> {
    let data = post_created(
        &format!("{}/api/departments", base_url),
        &json!({ "name": name }),
    )
    .await?;
    data.get("id").and_then(Value::as_i64).context("department id")
}

pub async fn create_category(base_url: &str, name: &str) -> Result<i64> {
    let data = post_created(
        &format!("{}/api/categories", base_url),
        &json!({ "name": name }),
    )
    .await?;
    data.get("id").and_then(Value::as_i64).context("category id")
}

pub async fn create_employee(base_url: &str, username: &str, department: i64) -> Result<i64> {
    let data = post_created(
        &format!("{}/api/employees", base_url),
        &json!({
            "username": username,
            "first_name": "Test",
            "last_name": "Holder",
            "email": format!("{}@example.com", username),
            "department": department,
            "position": "Engineer"
        }),
    )
    .await?;
    data.get("id").and_then(Value::as_i64).context("employee id")
}

pub async fn create_asset(base_url: &str, payload: &Value) -> Result<Value> {
    post_created(&format!("{}/api/assets", base_url), payload).await
}
