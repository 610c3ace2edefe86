//! Ledger RPC access layer
//!
//! The rest of the crate talks to the ledger through the `LedgerRpc` trait so
//! that composition and watching can be tested against deterministic doubles.
//! `SolanaLedger` is the production implementation over the nonblocking
//! `solana-client` RPC client, constructed with an explicit endpoint and
//! timeout (no ambient globals) and pinned to confirmed commitment.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use solana_client::{
    client_error::ClientError, nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
};
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey};
use solana_transaction_status::TransactionConfirmationStatus;
use thiserror::Error;

/// Errors from the ledger RPC layer.
///
/// The watcher treats every variant as transient; the composer maps them to
/// `CheckpointUnavailable` at composition time.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Transport-level failure (network, timeout, malformed response)
    #[error("ledger rpc transport error: {0}")]
    Transport(String),
}

impl From<ClientError> for LedgerError {
    fn from(err: ClientError) -> Self {
        LedgerError::Transport(err.to_string())
    }
}

/// Degree of consensus certainty attached to an observed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FinalityLevel {
    Processed,
    Confirmed,
    Finalized,
}

impl From<TransactionConfirmationStatus> for FinalityLevel {
    fn from(status: TransactionConfirmationStatus) -> Self {
        match status {
            TransactionConfirmationStatus::Processed => FinalityLevel::Processed,
            TransactionConfirmationStatus::Confirmed => FinalityLevel::Confirmed,
            TransactionConfirmationStatus::Finalized => FinalityLevel::Finalized,
        }
    }
}

impl fmt::Display for FinalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalityLevel::Processed => write!(f, "processed"),
            FinalityLevel::Confirmed => write!(f, "confirmed"),
            FinalityLevel::Finalized => write!(f, "finalized"),
        }
    }
}

/// One signature associated with a reference key
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    /// Base58 transaction signature
    pub signature: String,

    /// Slot the transaction landed in
    pub slot: u64,

    /// On-chain execution error, if the transaction failed
    pub err: Option<String>,

    /// Consensus level observed for this signature
    pub finality: FinalityLevel,
}

impl SignatureRecord {
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

/// Ledger operations the checkout pipeline depends on
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch a recent checkpoint hash for transaction compilation
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Batched account fetch; absent accounts come back as `None` in the
    /// same position as the requested key
    async fn multiple_accounts(
        &self,
        keys: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, LedgerError>;

    /// Signatures of confirmed transactions that reference the given key
    async fn signatures_for_reference(
        &self,
        reference: &Pubkey,
    ) -> Result<Vec<SignatureRecord>, LedgerError>;
}

/// Production ledger access over the nonblocking Solana RPC client
pub struct SolanaLedger {
    client: RpcClient,
}

impl SolanaLedger {
    /// Connect to an RPC endpoint with a bounded request timeout.
    ///
    /// Confirmed commitment keeps the watcher from reporting success on a
    /// transaction the ledger may still roll back.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            endpoint.into(),
            timeout,
            CommitmentConfig::confirmed(),
        );
        Self { client }
    }
}

#[async_trait]
impl LedgerRpc for SolanaLedger {
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn multiple_accounts(
        &self,
        keys: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, LedgerError> {
        Ok(self.client.get_multiple_accounts(keys).await?)
    }

    async fn signatures_for_reference(
        &self,
        reference: &Pubkey,
    ) -> Result<Vec<SignatureRecord>, LedgerError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            commitment: Some(CommitmentConfig::confirmed()),
            limit: Some(10),
            ..Default::default()
        };
        let statuses = self
            .client
            .get_signatures_for_address_with_config(reference, config)
            .await?;
        Ok(statuses
            .into_iter()
            .map(|status| SignatureRecord {
                signature: status.signature,
                slot: status.slot,
                err: status.err.map(|e| e.to_string()),
                finality: status
                    .confirmation_status
                    .map(FinalityLevel::from)
                    // the query itself runs at confirmed commitment
                    .unwrap_or(FinalityLevel::Confirmed),
            })
            .collect())
    }
}
