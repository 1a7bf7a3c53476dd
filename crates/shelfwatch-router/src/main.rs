//! Shelfwatch Router CLI
//!
//! Starts the HTTP trigger server, or runs a single alert pass with `--run-once`.

use shelfwatch_router::handlers::RunPassResponse;
use shelfwatch_router::{config::RouterConfig, init_tracing, run_once, start_server, RouterError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RouterError> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).ok_or_else(|| {
                RouterError::Server("--config requires a path".to_string())
            })?;
            RouterConfig::from_file(path)?
        }
        None => {
            eprintln!("Warning: No config file specified, using default test configuration");
            eprintln!("Usage: shelfwatch-router --config <path-to-config.toml> [--run-once]");
            eprintln!();
            RouterConfig::default_test_config()
        }
    };

    init_tracing();

    if args.iter().any(|a| a == "--run-once") {
        let report = run_once(&config)?;
        println!("{}", serde_json::to_string_pretty(&RunPassResponse::from(&report))?);
        return Ok(());
    }

    start_server(config).await
}

fn print_help() {
    println!("Shelfwatch Router - Inventory Aging Alerts");
    println!();
    println!("USAGE:");
    println!("    shelfwatch-router --config <path-to-config.toml> [--run-once]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --run-once         Run one alert pass, print the report as JSON, and exit");
    println!("    --help             Print this help message");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /alerts/run       Run one alert pass (optional body: {{\"now\": <unix secs>}})");
    println!("    GET  /aging/summary    Bucket counts for in-stock items");
    println!("    GET  /health           Liveness check");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - database_path: SQLite database file (default: shelfwatch.db)");
    println!("    - run_worker: Also run scheduled passes in the background");
    println!("    - [sweeper]: sweep_interval_minutes, batch_limit, pass_deadline_secs, dry_run");
    println!();
}
