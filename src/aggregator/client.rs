//! HTTP client for the swap aggregator
//!
//! Two calls per composition: an exact-output quote, then the corresponding
//! instruction set. Each call carries its own bounded timeout so a slow quote
//! cannot silently eat the instruction call's budget. There are no retries
//! here; retry policy belongs to the caller.

use std::time::Duration;

use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::aggregator::errors::AggregatorError;
use crate::aggregator::types::{Quote, SwapInstructionsResponse};
use crate::config::AggregatorConfig;

/// Client for the aggregator's quote and swap-instructions endpoints
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    slippage_bps: u16,
    dynamic_compute_unit_limit: bool,
    dynamic_slippage: bool,
}

impl AggregatorClient {
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            slippage_bps: config.slippage_bps,
            dynamic_compute_unit_limit: config.dynamic_compute_unit_limit,
            dynamic_slippage: config.dynamic_slippage,
        }
    }

    /// Fetch an exact-output quote for `input_mint -> output_mint`.
    ///
    /// # Errors
    /// - `Unreachable` on network failure or timeout
    /// - `NoRoute` when the aggregator answers but has no viable route
    /// - `Http` / `Malformed` for any other contract violation
    pub async fn quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        exact_out_amount: u64,
    ) -> Result<Quote, AggregatorError> {
        let url = format!("{}/quote", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", exact_out_amount.to_string()),
                ("slippageBps", self.slippage_bps.to_string()),
                ("swapMode", "ExactOut".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AggregatorError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AggregatorError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| AggregatorError::Malformed(format!("quote body: {e}")))?;
        debug!(input = %input_mint, output = %output_mint, amount = exact_out_amount, "quote received");
        Ok(Quote(value))
    }

    /// Fetch the instruction set executing a previously obtained quote.
    ///
    /// The quote is re-submitted verbatim. An inline `error` field on an
    /// HTTP-200 body is an explicit failure; a 200 status alone does not
    /// guarantee a usable instruction set.
    pub async fn swap_instructions(
        &self,
        quote: &Quote,
        buyer: &Pubkey,
        destination_token_account: &Pubkey,
    ) -> Result<SwapInstructionsResponse, AggregatorError> {
        let url = format!("{}/swap-instructions", self.base_url);
        let payload = json!({
            "quoteResponse": quote.0,
            "userPublicKey": buyer.to_string(),
            "destinationTokenAccount": destination_token_account.to_string(),
            "dynamicComputeUnitLimit": self.dynamic_compute_unit_limit,
            "dynamicSlippage": self.dynamic_slippage,
        });

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AggregatorError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AggregatorError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let instructions: SwapInstructionsResponse = serde_json::from_str(&body)
            .map_err(|e| AggregatorError::Malformed(format!("swap-instructions body: {e}")))?;

        if let Some(error) = &instructions.error {
            return Err(AggregatorError::InlineError(error.clone()));
        }
        if instructions.swap_instruction.is_none() {
            return Err(AggregatorError::Malformed(
                "response carries no swap instruction".to_string(),
            ));
        }

        debug!(
            setup = instructions.setup_instructions.len(),
            compute_budget = instructions.compute_budget_instructions.len(),
            cleanup = instructions.cleanup_instruction.is_some(),
            lookup_tables = instructions.address_lookup_table_addresses.len(),
            "swap instructions received"
        );
        Ok(instructions)
    }
}

/// Classify a non-2xx response.
///
/// Route exhaustion comes back as a client error with an inline message
/// naming the route; everything else stays a generic HTTP failure.
fn classify_failure(status: u16, body: &str) -> AggregatorError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    if (400..500).contains(&status) && detail.to_ascii_lowercase().contains("route") {
        AggregatorError::NoRoute(detail)
    } else {
        AggregatorError::Http { status, detail }
    }
}
