// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use canon_server::{build_router, check_store, validate_startup_config_contract, ApiConfig, AppState};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn api_config_from_env() -> ApiConfig {
    let defaults = ApiConfig::default();
    ApiConfig {
        bind_addr: env::var("CANON_BIND").unwrap_or(defaults.bind_addr),
        db_path: env::var("CANON_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path),
        log_json: env_bool("CANON_LOG_JSON", true),
        max_body_bytes: env_usize("CANON_MAX_BODY_BYTES", 16 * 1024),
        request_timeout: env_duration_ms("CANON_REQUEST_TIMEOUT_MS", 5000),
        sqlite_busy_timeout: env_duration_ms("CANON_SQLITE_BUSY_TIMEOUT_MS", 800),
        slow_query_threshold: env_duration_ms("CANON_SLOW_QUERY_THRESHOLD_MS", 200),
        default_page_size: env_usize("CANON_DEFAULT_PAGE_SIZE", 20),
        max_page_size: env_usize("CANON_MAX_PAGE_SIZE", 100),
        shutdown_drain: env_duration_ms("CANON_SHUTDOWN_DRAIN_MS", 2000),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let api_cfg = api_config_from_env();
    init_tracing(api_cfg.log_json);
    validate_startup_config_contract(&api_cfg)?;
    let limits = api_cfg.query_limits()?;

    let bind_addr = api_cfg.bind_addr.clone();
    let drain = api_cfg.shutdown_drain;
    let state = AppState::with_config(api_cfg, limits);
    // Serve anyway so /readyz can report the failure.
    if let Err(e) = check_store(&state).await {
        error!("store not ready: {e}");
    }
    let app = build_router(state);

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("canon-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            info!(
                drain_ms = u64::try_from(drain.as_millis()).unwrap_or(u64::MAX),
                "shutdown signal received; draining"
            );
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
