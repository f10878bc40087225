use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use tokio_util::sync::CancellationToken;
use usage_tracker::config::UsageTrackerConfig;
use usage_tracker::UsageTracker;

mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Pulse Server - usage tracking backend with a live dashboard
#[derive(Parser)]
#[command(name = "pulse-server")]
#[command(about = "Pulse Server - usage tracking backend with a live dashboard")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides PORT and config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and the data directory
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // PORT first, so --port wins
    config.apply_env_overrides();
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Pulse Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config).await,
    }
}

/// Typed module sections; fails on unknown keys.
fn module_configs(config: &AppConfig) -> Result<(UsageTrackerConfig, ApiIngressConfig)> {
    let tracker = config.module_config(usage_tracker::module::MODULE_NAME)?;
    let ingress = config.module_config(api_ingress::MODULE_NAME)?;
    Ok((tracker, ingress))
}

async fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("resolve bind address {host}:{port}"))?
        .next()
        .with_context(|| format!("no address found for {host}:{port}"))
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let (tracker_cfg, ingress_cfg) = module_configs(&config)?;
    let home_dir = PathBuf::from(&config.server.home_dir);

    let tracker = UsageTracker::init(&tracker_cfg, &home_dir)
        .await
        .context("usage_tracker init failed")?;

    let timeout = (config.server.timeout_sec > 0)
        .then(|| Duration::from_secs(config.server.timeout_sec));
    let ingress = ApiIngress::new(ingress_cfg, timeout);
    let router = ingress.build_router(tracker.register_rest(axum::Router::new()));

    let addr = resolve_bind_addr(&config.server.host, config.server.port).await?;

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());

    ingress.serve(addr, router, cancel).await?;
    tracing::info!("Pulse Server stopped");
    Ok(())
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let (tracker_cfg, _) = module_configs(&config)?;
    resolve_bind_addr(&config.server.host, config.server.port).await?;

    // Creates the data dir and seeds missing collections, same as `run`
    UsageTracker::init(&tracker_cfg, Path::new(&config.server.home_dir))
        .await
        .context("data directory check failed")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
