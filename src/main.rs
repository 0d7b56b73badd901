//! watchgated - watch-link resolution service.

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use watchgate::config::{self, Config};
use watchgate::db::Database;
use watchgate::http::{AppState, run_http_server};
use watchgate::security::FingerprintHasher;
use watchgate::security::fingerprint::is_default_secret;
use watchgate::watch::{ResolverPolicy, sqlite_resolver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    info!(
        server = %config.server.name,
        address = %config.http.address,
        enforce_ip_binding = config.security.enforce_ip_binding_when_code_provided,
        "Starting watchgate"
    );

    // A guessable secret makes viewer fingerprints brute-forceable
    if is_default_secret(&config.security.fingerprint_secret) {
        if std::env::var("WATCHGATE_ALLOW_INSECURE_SECRET").is_ok() {
            tracing::warn!(
                "INSECURE: Running with weak fingerprint_secret (allowed via WATCHGATE_ALLOW_INSECURE_SECRET)"
            );
        } else {
            error!("FATAL: Insecure fingerprint_secret detected!");
            error!("  Set a strong secret in the config file:");
            error!("    [security]");
            error!("    fingerprint_secret = \"<random-32-char-string>\"");
            error!("  Generate one with: openssl rand -hex 32");
            error!("  For testing only, set WATCHGATE_ALLOW_INSECURE_SECRET=1 to bypass this check.");
            return Err(anyhow::anyhow!(
                "Refusing to start with insecure fingerprint_secret. See error messages above."
            ));
        }
    }

    watchgate::metrics::init();

    let db = Database::new(config.database_path()).await?;

    let policy = ResolverPolicy {
        enforce_ip_binding: config.security.enforce_ip_binding_when_code_provided,
        store_timeout: config.resolver.store_timeout(),
    };
    let hasher = FingerprintHasher::new(config.security.fingerprint_secret.clone());
    let resolver = Arc::new(sqlite_resolver(&db, hasher, policy));
    let state = AppState::new(resolver, config.http.trusted_proxies.clone());

    tokio::select! {
        result = run_http_server(config.http.address, state) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server failed");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    db.pool().close().await;
    info!("watchgate stopped");
    Ok(())
}
