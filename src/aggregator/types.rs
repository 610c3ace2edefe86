//! Transport-shape types for the aggregator API
//!
//! These are deliberately loose: the boundary keeps the aggregator's
//! camelCase JSON as-is, and nothing typed leaks past the decoder.

use serde::{Deserialize, Serialize};

/// An executable swap route for `input_mint -> output_mint` achieving an
/// exact output amount.
///
/// Opaque beyond re-submission: the body is carried as raw JSON and posted
/// back unchanged in the swap-instructions request. Used once, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote(pub serde_json::Value);

/// One account reference inside a raw instruction descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawAccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// Opaque instruction descriptor as the aggregator ships it:
/// base58 program id and account keys, base64 payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<RawAccountMeta>,
    pub data: String,
}

/// Swap-instructions response: ordered instruction groups plus the lookup
/// tables any of them reference by compressed index.
///
/// `error` can be populated on an otherwise-200 response; callers must check
/// it before trusting the rest of the body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInstructionsResponse {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub compute_budget_instructions: Vec<RawInstruction>,

    #[serde(default)]
    pub setup_instructions: Vec<RawInstruction>,

    /// Exactly one swap instruction on a usable response; optional here so
    /// inline-error bodies still deserialize
    #[serde(default)]
    pub swap_instruction: Option<RawInstruction>,

    #[serde(default)]
    pub cleanup_instruction: Option<RawInstruction>,

    #[serde(default)]
    pub address_lookup_table_addresses: Vec<String>,
}
