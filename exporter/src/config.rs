//! Top-level configuration for the exporter.
//!
//! This module aggregates configuration for:
//!
//! - the node RPC client (node URL + per-call timeout),
//! - optional version files that contribute identity labels,
//! - the exporter's own telemetry endpoint (enable flag + listen address),
//! - scrape behaviour (debug latency metrics, BABE block time).
//!
//! The goal is to have a single `ExporterConfig` struct that binaries can
//! construct from defaults, CLI flags or environment variables as needed.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the node JSON-RPC client.
#[derive(Clone, Debug)]
pub struct RpcClientConfig {
    /// HTTP JSON-RPC endpoint of the node, e.g. `"http://localhost:9933"`.
    pub url: String,
    /// Upper bound on a single RPC call, connect included.
    pub timeout: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9933".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Locations of the optional build metadata files shipped with the node image.
#[derive(Clone, Debug)]
pub struct VersionFilesConfig {
    /// File whose first line looks like `<prefix> <build> ...`.
    pub build_path: PathBuf,
    /// File whose lines are joined with `-` into the `substrate_ref` label.
    pub substrate_ref_path: PathBuf,
}

impl Default for VersionFilesConfig {
    fn default() -> Self {
        Self {
            build_path: PathBuf::from("/polkaversion/version"),
            substrate_ref_path: PathBuf::from("/polkaversion/substrate-ref"),
        }
    }
}

/// Configuration for the exporter's self-telemetry endpoint.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Whether to run the self-telemetry `/metrics` server.
    pub enabled: bool,
    /// Address to bind the telemetry HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9899"
            .parse()
            .expect("hard-coded telemetry listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level exporter configuration.
#[derive(Clone, Debug)]
pub struct ExporterConfig {
    pub rpc: RpcClientConfig,
    pub version_files: VersionFilesConfig,
    pub telemetry: TelemetryConfig,
    /// Appends per-call RPC latency to every scrape and enables the
    /// `/health` probe bypass.
    pub debug: bool,
    /// Slot duration used to turn BABE slot numbers into wall-clock seconds.
    pub block_time_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            rpc: RpcClientConfig::default(),
            version_files: VersionFilesConfig::default(),
            telemetry: TelemetryConfig::default(),
            debug: false,
            block_time_secs: 6,
        }
    }
}
