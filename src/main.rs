use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nmap_web_rs::cache::ScanCache;
use nmap_web_rs::nmap::NmapRunner;
use nmap_web_rs::server::{self, AppState};
use nmap_web_rs::service::ScanService;

/// nmap-web-rs — Trigger nmap host/port scans from a tiny web UI and get cached, structured JSON results.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nmap-web-rs",
    version,
    about = "Trigger nmap host/port scans from a tiny web UI and get cached, structured JSON results.",
    long_about = None
)]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Path to the nmap binary.
    #[arg(long, default_value = "nmap")]
    nmap: PathBuf,

    /// Seconds a cached scan result stays fresh.
    #[arg(long = "cache-ttl-secs", default_value_t = 300)]
    cache_ttl_secs: u64,

    /// Upper bound on a single nmap invocation, in seconds.
    #[arg(long = "scan-timeout-secs", default_value_t = 300)]
    scan_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("nmap-web-rs configuration:");
    println!("  bind              : {}", cli.bind);
    println!("  nmap              : {}", cli.nmap.display());
    println!("  cache_ttl_secs    : {}", cli.cache_ttl_secs);
    println!("  scan_timeout_secs : {}", cli.scan_timeout_secs);

    let runner = NmapRunner::new(cli.nmap, Duration::from_secs(cli.scan_timeout_secs));
    let state = AppState {
        cache: Arc::new(ScanCache::new(Duration::from_secs(cli.cache_ttl_secs))),
        service: Arc::new(ScanService::new(runner)),
    };

    server::spawn_server(&cli.bind, state).await
}
