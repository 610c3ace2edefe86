//! Payment intent types and inbound request validation
//!
//! A `PaymentIntent` is the immutable per-checkout record: who pays, who gets
//! paid, in which stablecoin, how much, and under which reference key. The
//! reference key is a freshly generated account identity that never signs and
//! holds no balance; it exists only to make the settled transaction
//! discoverable by a ledger-wide search.
//!
//! Inbound requests arrive as loosely-typed string parameters
//! (`CheckoutRequest`) and must be fully validated before any collaborator is
//! contacted.

use serde::Deserialize;
use std::str::FromStr;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use spl_associated_token_account::get_associated_token_address;

use crate::composer::errors::ComposeError;

/// Immutable payment intent, created once per checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Buyer account (fee payer and swap signer; signs externally)
    pub buyer: Pubkey,

    /// Merchant account receiving the settlement
    pub merchant: Pubkey,

    /// Mint of the token the buyer pays with
    pub input_mint: Pubkey,

    /// Mint of the stablecoin the merchant receives
    pub settlement_mint: Pubkey,

    /// Settlement amount in minor units (already scaled by the mint decimals)
    pub amount_minor_units: u64,

    /// Single-use reference key tagged onto the fee-tip instruction
    pub reference: Pubkey,
}

impl PaymentIntent {
    /// Generate a fresh single-use reference key.
    ///
    /// The keypair is discarded immediately; only the public key survives, so
    /// nothing can ever sign for it.
    pub fn generate_reference() -> Pubkey {
        Keypair::new().pubkey()
    }

    /// The merchant's associated token account for the settlement mint.
    ///
    /// Used as the aggregator's swap destination so the output lands directly
    /// with the merchant.
    pub fn settlement_account(&self) -> Pubkey {
        get_associated_token_address(&self.merchant, &self.settlement_mint)
    }
}

/// Raw inbound checkout request, mirroring the caller's query parameters.
///
/// All fields are optional strings on purpose: absence of any required field
/// is a client error surfaced before the aggregator or the ledger is touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    /// Buyer account key
    pub account: Option<String>,

    /// Human-readable settlement amount, e.g. "1.5"
    pub amount: Option<String>,

    /// Mint of the token the buyer pays with
    pub token_mint: Option<String>,

    /// Reference key generated by the merchant side
    pub reference: Option<String>,

    /// Merchant account key
    pub merchant: Option<String>,
}

impl CheckoutRequest {
    /// Validate the request into a `PaymentIntent`.
    ///
    /// `settlement_mint` and `settlement_decimals` come from configuration.
    /// Fails with `ComposeError::Validation` on any missing or malformed
    /// field; no network call is attempted by this function.
    pub fn validate(
        &self,
        settlement_mint: Pubkey,
        settlement_decimals: u8,
    ) -> Result<PaymentIntent, ComposeError> {
        let buyer = parse_key("account", self.account.as_deref())?;
        let amount = self
            .amount
            .as_deref()
            .ok_or_else(|| missing("amount"))?;
        let input_mint = parse_key("token_mint", self.token_mint.as_deref())?;
        let reference = parse_key("reference", self.reference.as_deref())?;
        let merchant = parse_key("merchant", self.merchant.as_deref())?;

        let amount_minor_units = parse_amount(amount, settlement_decimals)?;

        Ok(PaymentIntent {
            buyer,
            merchant,
            input_mint,
            settlement_mint,
            amount_minor_units,
            reference,
        })
    }
}

/// Scale a human-readable decimal amount into minor units.
///
/// `"1.5"` with 6 decimals becomes `1_500_000`.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<u64, ComposeError> {
    let value: f64 = amount
        .trim()
        .parse()
        .map_err(|_| ComposeError::Validation(format!("amount '{amount}' is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ComposeError::Validation(format!(
            "amount '{amount}' must be a positive number"
        )));
    }
    let scaled = value * 10f64.powi(decimals as i32);
    if scaled > u64::MAX as f64 {
        return Err(ComposeError::Validation(format!(
            "amount '{amount}' overflows minor units"
        )));
    }
    Ok(scaled.round() as u64)
}

fn missing(field: &str) -> ComposeError {
    ComposeError::Validation(format!("missing required parameter '{field}'"))
}

fn parse_key(field: &str, value: Option<&str>) -> Result<Pubkey, ComposeError> {
    let raw = value.ok_or_else(|| missing(field))?;
    Pubkey::from_str(raw)
        .map_err(|e| ComposeError::Validation(format!("invalid {field} '{raw}': {e}")))
}
