//! paygate - stablecoin checkout CLI
//!
//! Thin command-line surface over the library: `compose` builds one signable
//! checkout transaction for a payment intent, `watch` polls the ledger for
//! settlement of a reference key. The HTTP surface and UI are external
//! collaborators; this binary exists for operating and debugging the
//! pipeline directly.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![warn(unused_must_use)]

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solana_sdk::pubkey::Pubkey;

use paygate::aggregator::AggregatorClient;
use paygate::composer::{ComposerPolicy, TransactionComposer};
use paygate::config::Config;
use paygate::intent::CheckoutRequest;
use paygate::ledger::SolanaLedger;
use paygate::payment_url::payment_url;
use paygate::watcher::{ConfirmationWatcher, WatchStatus};
use paygate::PaymentIntent;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose one signable checkout transaction
    Compose {
        /// Buyer account key (fee payer; signs in their own wallet)
        #[arg(long)]
        buyer: String,

        /// Mint of the token the buyer pays with
        #[arg(long)]
        input_mint: String,

        /// Settlement amount in human-readable units, e.g. "1.5"
        #[arg(long)]
        amount: String,

        /// Merchant account key
        #[arg(long)]
        merchant: String,

        /// Reference key; generated fresh when omitted
        #[arg(long)]
        reference: Option<String>,

        /// Checkout endpoint to embed in the printed payment URL
        #[arg(long, default_value = "https://localhost/api/checkout")]
        endpoint: String,
    },

    /// Watch the ledger for settlement of a reference key
    Watch {
        /// Reference key to watch
        #[arg(long)]
        reference: String,

        /// Give up after this many seconds
        #[arg(long, default_value = "120")]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args.config)?;

    match args.command {
        Command::Compose {
            buyer,
            input_mint,
            amount,
            merchant,
            reference,
            endpoint,
        } => {
            let reference = reference.unwrap_or_else(|| {
                let generated = PaymentIntent::generate_reference();
                info!(reference = %generated, "generated fresh reference key");
                generated.to_string()
            });

            let request = CheckoutRequest {
                account: Some(buyer),
                amount: Some(amount.clone()),
                token_mint: Some(input_mint.clone()),
                reference: Some(reference.clone()),
                merchant: Some(merchant),
            };
            let intent = request
                .validate(
                    config.checkout.settlement_mint()?,
                    config.checkout.settlement_decimals,
                )
                .context("invalid checkout request")?;

            let rpc = Arc::new(SolanaLedger::new(
                config.rpc.endpoint.clone(),
                config.rpc.timeout(),
            ));
            let aggregator = AggregatorClient::new(&config.aggregator);
            let policy = ComposerPolicy {
                fee_tip_lamports: config.checkout.fee_tip_lamports,
                fee_tip_recipient: config.checkout.fee_tip_recipient()?,
                message: config.checkout.message.clone(),
            };
            let composer = TransactionComposer::new(rpc, aggregator, policy);

            let composed = composer
                .compose(&intent)
                .await
                .map_err(|e| anyhow::anyhow!("composition failed ({}): {e}", e.kind()))?;

            let url = payment_url(
                &endpoint,
                &[
                    ("amount", amount),
                    ("tokenMint", input_mint),
                    ("reference", reference),
                ],
            );
            println!("{}", serde_json::to_string_pretty(&composed)?);
            println!("payment url: {url}");
        }

        Command::Watch {
            reference,
            timeout_secs,
        } => {
            let reference = Pubkey::from_str(&reference)
                .map_err(|e| anyhow::anyhow!("invalid reference key: {e}"))?;
            let rpc = Arc::new(SolanaLedger::new(
                config.rpc.endpoint.clone(),
                config.rpc.timeout(),
            ));
            let watcher = ConfirmationWatcher::new(rpc, config.watcher.poll_interval());
            let mut handle = watcher.spawn(reference);
            let mut status_rx = handle.status();

            let terminal = tokio::select! {
                changed = status_rx.changed() => {
                    changed.ok();
                    handle.join().await
                }
                _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
                    warn!(reference = %reference, "watch timed out");
                    handle.cancel();
                    handle.join().await
                }
            };

            match terminal {
                WatchStatus::Confirmed(result) => {
                    println!("confirmed: signature={} finality={}", result.signature, result.finality);
                }
                WatchStatus::Aborted => {
                    println!("aborted: no settlement observed for {reference}");
                }
                WatchStatus::Waiting => unreachable!("watcher terminated while waiting"),
            }
        }
    }

    Ok(())
}

/// Initialize the logging subsystem
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "paygate=debug,info"
    } else {
        "paygate=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}
