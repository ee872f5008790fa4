//! Relayer Service
//!
//! A relay service that anchors receipts across EVM chains. Relay requests
//! fan out one bridge job per target chain; each job is submitted with
//! bounded retry and then watched until its transaction is confirmed,
//! fails, or times out. All progress is observable through the REST API.

use anyhow::Result;
use tracing::info;

use relayer::api::ApiServer;
use relayer::config::Config;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point that initializes and runs the relayer.
///
/// This function:
/// 1. Initializes logging and tracing
/// 2. Loads configuration from TOML file
/// 3. Builds the shared context (stores, per-chain clients)
/// 4. Runs the API server until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging for debugging and monitoring
    tracing_subscriber::fmt::init();

    info!("Starting Relayer Service");

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for help flag
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("Relayer Service");
        println!();
        println!("Usage: relayer [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  RELAYER_CONFIG_PATH    Path to config file (overrides --config)");
        return Ok(());
    }

    // Check for custom config path
    let mut config_path = None;
    for (i, arg) in args.iter().enumerate() {
        if arg == "--config" && i + 1 < args.len() {
            config_path = Some(args[i + 1].clone());
            break;
        }
    }

    if let Some(path) = config_path {
        std::env::set_var("RELAYER_CONFIG_PATH", &path);
        info!("Using custom config: {}", path);
    }

    // Load configuration from config file (or RELAYER_CONFIG_PATH env var)
    let config = Config::load()?;
    info!(
        "Configuration loaded successfully ({} target chain(s) configured)",
        config.configured_chains().len()
    );

    // Build the API server; relay pipelines are spawned per request
    let api_server = ApiServer::new(config)?;

    // Run the service (this blocks until shutdown)
    api_server.run().await?;

    Ok(())
}
