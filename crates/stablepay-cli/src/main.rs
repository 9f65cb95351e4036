/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: JSON results of widget backend operations on stdout
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stablepay_adapter::WidgetConfig;
use stablepay_cli::commands;

#[derive(Parser, Debug)]
#[command(name = "stablepay", version, about = "Stablecoin checkout widget backend tools")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true, default_value = "stablepay.yaml")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the configuration
    Validate,
    /// Native and stablecoin balances of a Phantom wallet
    Balance {
        #[arg(long, value_name = "ADDR")]
        address: String,
        /// Keep syncing until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Cart transaction status for a wallet address
    TxStatus {
        #[arg(long, value_name = "ADDR")]
        address: String,
        /// Saved credentials (JSON)
        #[arg(long = "auth", value_name = "FILE")]
        auth_file: Option<PathBuf>,
    },
    /// Convert an amount between currencies
    Convert {
        #[arg(long)]
        amount: Decimal,
        #[arg(long, value_name = "CUR")]
        from: String,
        #[arg(long, value_name = "CUR")]
        to: String,
    },
    /// Caller country from IP geolocation
    Country,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(config_path = %args.config_path.display(), "starting stablepay");
    let config = load_config(&args.config_path)?;

    match args.command {
        Command::Validate => commands::validate(&config)?,
        Command::Balance { address, watch: false } => {
            print_json(&commands::balance(&config, &address).await?)?;
        }
        Command::Balance { address, watch: true } => {
            let shutdown = CancellationToken::new();
            setup_signal_handlers(shutdown.clone());
            commands::watch_balance(&config, &address, shutdown, |balances| print_json(balances))
                .await?;
            info!("balance watch stopped");
        }
        Command::TxStatus { address, auth_file } => {
            let status = commands::tx_status(&config, &address, auth_file.as_deref()).await?;
            print_json(&status)?;
        }
        Command::Convert { amount, from, to } => {
            print_json(&commands::convert(&config, amount, &from, &to).await?)?;
        }
        Command::Country => print_json(&commands::country(&config).await?)?,
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &Path) -> Result<WidgetConfig> {
    let path_str = path
        .to_str()
        .context("config path must be valid utf-8")?;
    WidgetConfig::from_file(path_str).context("load config")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("render output")?;
    println!("{rendered}");
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
