//! Command-line front end for the CoinPayments client.
//!
//! Credentials come from `--config <file.toml>` and/or the
//! `COINPAYMENTS_KEY` / `COINPAYMENTS_SECRET` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;

use coinpayments::config::{load_config, load_from_env, ClientConfig};
use coinpayments::observability::{logging, metrics};
use coinpayments::{ClientEvent, CoinPayments, Params};

#[derive(Parser)]
#[command(name = "coinpayments")]
#[command(about = "Call the CoinPayments API and follow transaction status", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show merchant account information
    BasicInfo,
    /// Exchange rates
    Rates {
        /// Only coins enabled on the account
        #[arg(long)]
        accepted: bool,
    },
    /// Coin balances
    Balances {
        /// Include zero balances
        #[arg(long)]
        all: bool,
    },
    /// Status of one transaction
    TxInfo { txid: String },
    /// Recent transaction ids
    TxList,
    /// A deposit address for a currency
    DepositAddress { currency: String },
    /// Create a payment
    CreateTransaction {
        #[arg(long)]
        amount: String,
        /// Currency the amount is priced in
        #[arg(long)]
        currency1: String,
        /// Currency the buyer pays with
        #[arg(long)]
        currency2: String,
        #[arg(long)]
        buyer_email: Option<String>,
        /// Poll the new transaction until it completes
        #[arg(long)]
        watch: bool,
    },
    /// Poll transactions until they reach a terminal status
    Watch {
        #[arg(required = true)]
        txids: Vec<String>,
    },
    /// Send any command with name=value fields
    Call {
        cmd: String,
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config: ClientConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };
    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let watch = matches!(
        cli.command,
        Commands::CreateTransaction { watch: true, .. } | Commands::Watch { .. }
    );
    if matches!(cli.command, Commands::CreateTransaction { watch: true, .. }) {
        config.tracking.auto_track = true;
    }

    let client = CoinPayments::from_config(config)?;
    let mut events = client.subscribe();

    let result = match cli.command {
        Commands::BasicInfo => client.get_basic_info().await?,
        Commands::Rates { accepted } => {
            let params = if accepted { Params::new().with("accepted", 1) } else { Params::new() };
            client.rates(params).await?
        }
        Commands::Balances { all } => {
            let params = if all { Params::new().with("all", 1) } else { Params::new() };
            client.balances(params).await?
        }
        Commands::TxInfo { txid } => client.get_tx(&txid).await?,
        Commands::TxList => client.get_tx_list(Params::new()).await?,
        Commands::DepositAddress { currency } => client.get_deposit_address(&currency).await?,
        Commands::CreateTransaction {
            amount,
            currency1,
            currency2,
            buyer_email,
            ..
        } => {
            let mut params = Params::new()
                .with("amount", amount)
                .with("currency1", currency1)
                .with("currency2", currency2);
            if let Some(email) = buyer_email {
                params.insert("buyer_email", email);
            }
            client.create_transaction(params).await?
        }
        Commands::Watch { txids } => {
            for txid in txids {
                client.track(txid)?;
            }
            Value::Null
        }
        Commands::Call { cmd, fields } => client.request(&cmd, fields.into_iter().collect()).await?,
    };

    if !result.is_null() {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if watch {
        follow(&client, &mut events).await?;
    }
    Ok(())
}

/// Print poll events until polling stops or Ctrl-C.
async fn follow(
    client: &CoinPayments,
    events: &mut tokio::sync::broadcast::Receiver<ClientEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut idle_check = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ClientEvent::AutoIpn(statuses)) => {
                    println!("{}", serde_json::to_string_pretty(&statuses)?);
                }
                Ok(ClientEvent::PollError(message)) => {
                    eprintln!("poll failed: {message}");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = idle_check.tick() => {
                if !client.is_polling() {
                    tracing::info!("All tracked transactions finished");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(
                    pending = client.pending_transactions().len(),
                    "Interrupted"
                );
                break;
            }
        }
    }
    Ok(())
}
