//! Ballot daemon: entry point for serving and exercising an election.

mod config;
mod scenario;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use ballot_election::{ElectionLedger, ElectionPolicy, RegistrationGate};
use ballot_nullables::NullElectionStore;
use ballot_rpc::RpcServer;
use ballot_types::Address;
use ballot_utils::LogFormat;
use clap::Parser;

use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "ballot-daemon", about = "Single-authority election daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Identity of the election authority.
    #[arg(long, env = "BALLOT_AUTHORITY")]
    authority: Option<Address>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Allow voter registration and new candidates in every stage.
    #[arg(long, env = "BALLOT_OPEN_REGISTRATION")]
    open_registration: bool,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the election over HTTP.
    Serve {
        /// Address to bind the RPC server to.
        #[arg(long, env = "BALLOT_BIND")]
        bind: Option<IpAddr>,

        /// RPC server port.
        #[arg(long, env = "BALLOT_RPC_PORT")]
        port: Option<u16>,
    },
    /// Run the scripted demo election and print the winner.
    Demo,
    /// Run the demo election and print the resulting election details as JSON.
    Details,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(authority) = cli.authority {
        config.authority = authority;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.open_registration {
        config.policy.registration_gate = RegistrationGate::Open;
    }
    if let Command::Serve { bind, port } = &cli.command {
        config.bind = bind.unwrap_or(config.bind);
        config.rpc_port = port.unwrap_or(config.rpc_port);
    }

    ballot_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Serve { .. } => serve(config).await?,
        Command::Demo => {
            let ledger = new_ledger(&config.authority, config.policy)?;
            let winner = scenario::run(&ledger, &config.authority)?;
            println!("Winner: {} ({} votes)", winner.name, winner.vote_count);
        }
        Command::Details => {
            let ledger = new_ledger(&config.authority, config.policy)?;
            scenario::run(&ledger, &config.authority)?;
            println!("{}", serde_json::to_string_pretty(&ledger.summary())?);
        }
        Command::Config => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    let ledger = Arc::new(new_ledger(&config.authority, config.policy)?);
    tracing::info!(
        "Starting election for authority {} (registration gate: {:?})",
        config.authority,
        config.policy.registration_gate
    );

    let server = RpcServer::new(config.rpc_addr(), ledger);
    server
        .start(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received, stopping RPC server");
        })
        .await?;

    tracing::info!("ballot daemon exited cleanly");
    Ok(())
}

fn new_ledger(authority: &Address, policy: ElectionPolicy) -> anyhow::Result<ElectionLedger> {
    let store = Arc::new(NullElectionStore::new());
    Ok(ElectionLedger::open_or_create(
        store,
        authority.clone(),
        policy,
    )?)
}
