//! MPT lifecycle demo (v1)
//!
//! # Commands
//!
//! ```text
//! mpt-demo [--config demo.toml] run     issue → authorize → transfer on testnet
//! mpt-demo [--config demo.toml] serve   greeting endpoint on GET /
//! ```
//!
//! `run` is the default when no command is given.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use mpt_demo::config::{load_or_default, DemoConfig};
use mpt_demo::lifecycle::signals::shutdown_on_ctrl_c;
use mpt_demo::observability::{logging, metrics};
use mpt_demo::{GreetingServer, JsonRpcClient, MptDemo, Shutdown};

#[derive(Parser)]
#[command(name = "mpt-demo")]
#[command(about = "XRPL Multi-Purpose Token lifecycle demo", long_about = None)]
struct Cli {
    /// Optional TOML config file; built-in defaults otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an MPT issuance, authorize the holder and transfer to it
    Run,
    /// Serve the greeting endpoint
    Serve {
        /// Overrides server.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!("mpt-demo v0.1.0 starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_demo(&config).await?,
        Commands::Serve { bind } => serve(config, bind).await?,
    }

    Ok(())
}

async fn run_demo(config: &DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = JsonRpcClient::new(&config.ledger)?;
    println!("Connecting to XRPL at {}...", client.url());

    let outcome = MptDemo::new(&client, config).run().await?;

    tracing::info!(
        issuance_id = %outcome.issuance_id,
        issuance_tx = %outcome.issuance_hash,
        authorize_tx = %outcome.authorize_hash,
        transfer_tx = %outcome.transfer_hash,
        holder_balance = outcome.holder_balance,
        "Demo finished"
    );
    Ok(())
}

async fn serve(mut config: DemoConfig, bind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = GreetingServer::new(config.server.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown_on_ctrl_c(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
