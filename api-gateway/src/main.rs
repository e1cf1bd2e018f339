// api-gateway/src/main.rs

//! Exporter gateway binary.
//!
//! This binary exposes the exporter over HTTP:
//!
//! - `GET /metrics` (node metrics in Prometheus text format)
//! - `GET /babeauthorship` (BABE slots claimed this epoch)
//! - `GET /health` (200/500/502 liveness for load balancers)
//!
//! and, unless disabled, the exporter's own telemetry on a separate
//! listener.

mod config;
mod routes;
mod state;

use std::sync::Arc;
use std::time::SystemTime;

use clap::Parser;
use tokio::signal;

use config::Args;
use dot_exporter::{
    DefaultExporter, ExporterState, HttpNodeRpc, TelemetryRegistry, run_telemetry_http_server,
};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "debug"
    } else {
        "dotexporter=info,dot_exporter=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        )
        .init();

    if let Err(e) = run(args).await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), String> {
    let cfg = args.exporter_config();

    // ---------------------------
    // Telemetry
    // ---------------------------

    let telemetry = Arc::new(
        TelemetryRegistry::new()
            .map_err(|e| format!("failed to initialise telemetry registry: {e}"))?,
    );

    if cfg.telemetry.enabled {
        let telemetry_clone = telemetry.clone();
        let addr = cfg.telemetry.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_telemetry_http_server(telemetry_clone, addr).await {
                tracing::error!("telemetry HTTP server error: {e}");
            }
        });
        tracing::info!("telemetry exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Node client + shared state
    // ---------------------------

    let rpc = HttpNodeRpc::new(&cfg.rpc)
        .map_err(|e| format!("failed to create node RPC client: {e}"))?;
    tracing::info!(
        node_url = rpc.url(),
        timeout_secs = cfg.rpc.timeout.as_secs(),
        debug = cfg.debug,
        "polling node on demand"
    );

    let exporter_state = Arc::new(ExporterState::new(SystemTime::now()));
    let exporter: DefaultExporter = DefaultExporter::new(
        rpc,
        exporter_state,
        cfg,
        telemetry.exporter.clone(),
    );

    let app_state: SharedState = Arc::new(AppState { exporter });

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app = routes::router(app_state);
    let listen_addr = args.listen_addr();

    tracing::info!("serving requests on http://{}", listen_addr);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| format!("failed to bind {listen_addr}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
