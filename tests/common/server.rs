//! Test server management.
//!
//! Spawns and manages watchgated instances for integration testing.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;
use watchgate::db::Database;

pub const TEST_SECRET: &str = "TestSecret-2026-Secure!9X-fingerprints";

/// Knobs that vary between test servers.
#[derive(Debug, Clone)]
pub struct TestServerOptions {
    pub enforce_ip_binding: bool,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            enforce_ip_binding: true,
        }
    }
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: tempfile::TempDir,
    client: reqwest::Client,
}

impl TestServer {
    /// Create a fresh data directory and open (and migrate) its database for seeding.
    pub async fn prepare() -> anyhow::Result<(tempfile::TempDir, Database)> {
        let data_dir = tempfile::tempdir()?;
        let db = Database::new(db_path(data_dir.path()).to_str().unwrap()).await?;
        Ok((data_dir, db))
    }

    /// Spawn a server over a prepared data directory.
    pub async fn spawn(data_dir: tempfile::TempDir, options: TestServerOptions) -> anyhow::Result<Self> {
        let port = free_port()?;
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "watchgate-test"

[http]
address = "127.0.0.1:{}"
trusted_proxies = ["127.0.0.0/8"]

[database]
path = "{}"

[security]
fingerprint_secret = "{}"
enforce_ip_binding_when_code_provided = {}

[resolver]
store_timeout_ms = 2000
"#,
            port,
            db_path(data_dir.path()).display(),
            TEST_SECRET,
            options.enforce_ip_binding,
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_watchgated"))
            .arg(config_path.to_str().unwrap())
            .env("RUST_LOG", "warn")
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
            client: reqwest::Client::new(),
        };

        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Stop the process and hand back its data directory, for restart tests.
    pub fn stop(mut self) -> tempfile::TempDir {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let placeholder = tempfile::tempdir().expect("tempdir");
        std::mem::replace(&mut self.data_dir, placeholder)
    }

    /// Wait until the server answers its health check.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if let Ok(resp) = self.client.get(self.url("/healthz")).send().await
                && resp.status().is_success()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Request a watch link as if from `viewer_ip` (sent via X-Forwarded-For).
    pub async fn watch(
        &self,
        org: &str,
        team: &str,
        code: Option<&str>,
        viewer_ip: &str,
    ) -> anyhow::Result<reqwest::Response> {
        let mut request = self
            .client
            .get(self.url(&format!("/api/public/watch/{}/{}", org, team)))
            .header("x-forwarded-for", viewer_ip);
        if let Some(code) = code {
            request = request.query(&[("code", code)]);
        }
        Ok(request.send().await?)
    }

    pub async fn metrics(&self) -> anyhow::Result<String> {
        Ok(self.client.get(self.url("/metrics")).send().await?.text().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("watchgate.db")
}

fn free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
