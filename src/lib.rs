//! paygate - stablecoin checkout for arbitrary fungible tokens
//!
//! Composes a single atomic Solana transaction that swaps a buyer's token
//! into the merchant's settlement stablecoin via an external liquidity
//! aggregator, tags it with a single-use reference key, and appends a
//! network-priority tip. A companion watcher polls the ledger for the
//! reference and reports confirmation. The system holds no funds and no
//! keys; signing and broadcast happen in the buyer's wallet.

pub mod aggregator;
pub mod composer;
pub mod config;
pub mod intent;
pub mod ledger;
pub mod payment_url;
pub mod watcher;

// Re-export commonly used types
pub use composer::{ComposeError, ComposedTransaction, ComposerPolicy, TransactionComposer};
pub use intent::{CheckoutRequest, PaymentIntent};
pub use ledger::{FinalityLevel, LedgerRpc, SolanaLedger};
pub use watcher::{ConfirmationResult, ConfirmationWatcher, WatchStatus, WatcherHandle};
pub use solana_sdk::pubkey::Pubkey;
