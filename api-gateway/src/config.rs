//! Gateway configuration.
//!
//! Every setting is both a long-form CLI flag and an environment variable,
//! so the exporter can be configured from a container manifest alone.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, builder::FalseyValueParser};

use dot_exporter::{ExporterConfig, RpcClientConfig, TelemetryConfig, VersionFilesConfig};

/// Runtime configuration for the exporter gateway.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Node HTTP JSON-RPC endpoint.
    #[arg(long, env = "NODE_URL", default_value = "http://localhost:9933")]
    pub node_url: String,

    /// Interface to serve /metrics, /babeauthorship and /health on.
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0")]
    pub listen: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Adds per-call RPC latency to scrapes and enables the health probe bypass.
    /// As an env var, any value other than false/no/off/0/empty turns it on.
    #[arg(long, env = "DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Timeout for a single node RPC call, in seconds.
    #[arg(long, env = "RPC_TIMEOUT", default_value_t = 10)]
    pub rpc_timeout: u64,

    /// Slot duration in seconds, used to date BABE authorship slots.
    #[arg(long, env = "BLOCK_TIME", default_value_t = 6)]
    pub block_time: u64,

    #[arg(long, env = "VERSION_FILE", default_value = "/polkaversion/version")]
    pub version_file: PathBuf,

    #[arg(long, env = "SUBSTRATE_REF_FILE", default_value = "/polkaversion/substrate-ref")]
    pub substrate_ref_file: PathBuf,

    /// Serve the exporter's own metrics on `--telemetry-listen`.
    #[arg(
        long,
        env = "TELEMETRY_ENABLED",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = FalseyValueParser::new()
    )]
    pub telemetry_enabled: bool,

    #[arg(long, env = "TELEMETRY_LISTEN", default_value = "127.0.0.1:9899")]
    pub telemetry_listen: SocketAddr,
}

impl Args {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen, self.port)
    }

    pub fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig {
            rpc: RpcClientConfig {
                url: self.node_url.clone(),
                timeout: Duration::from_secs(self.rpc_timeout.max(1)),
            },
            version_files: VersionFilesConfig {
                build_path: self.version_file.clone(),
                substrate_ref_path: self.substrate_ref_file.clone(),
            },
            telemetry: TelemetryConfig {
                enabled: self.telemetry_enabled,
                listen_addr: self.telemetry_listen,
            },
            debug: self.debug,
            block_time_secs: self.block_time,
        }
    }
}
