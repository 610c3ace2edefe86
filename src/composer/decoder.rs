//! Instruction decoder
//!
//! Pure, stateless transform from the aggregator's opaque descriptors into
//! ledger-native instructions. Nothing loosely typed survives past this
//! module: account keys become `Pubkey`s, payloads become bytes, and the
//! whole response collapses into a `DecodedInstructionSet` with the groups
//! the composer orders later.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::str::FromStr;

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::aggregator::types::{RawInstruction, SwapInstructionsResponse};
use crate::composer::errors::ComposeError;

/// Strongly-typed instruction set ready for ordering
#[derive(Debug, Clone)]
pub struct DecodedInstructionSet {
    pub compute_budget: Vec<Instruction>,
    pub setup: Vec<Instruction>,
    pub swap: Instruction,
    pub cleanup: Option<Instruction>,
    pub lookup_table_keys: Vec<Pubkey>,
}

/// Decode one raw descriptor into a ledger-native instruction.
///
/// Fails with `MalformedInstruction` if any account key is not a well-formed
/// identity or the payload is not valid base64.
pub fn decode_instruction(raw: &RawInstruction) -> Result<Instruction, ComposeError> {
    let program_id = parse_pubkey("program id", &raw.program_id)?;
    let accounts = raw
        .accounts
        .iter()
        .map(|meta| {
            Ok(AccountMeta {
                pubkey: parse_pubkey("account key", &meta.pubkey)?,
                is_signer: meta.is_signer,
                is_writable: meta.is_writable,
            })
        })
        .collect::<Result<Vec<_>, ComposeError>>()?;
    let data = BASE64_STANDARD
        .decode(&raw.data)
        .map_err(|e| ComposeError::malformed(format!("instruction payload: {e}")))?;

    Ok(Instruction {
        program_id,
        accounts,
        data,
    })
}

/// Decode the whole aggregator response, including the lookup-table key list.
pub fn decode_instruction_set(
    response: &SwapInstructionsResponse,
) -> Result<DecodedInstructionSet, ComposeError> {
    let swap_raw = response
        .swap_instruction
        .as_ref()
        .ok_or_else(|| ComposeError::malformed("response carries no swap instruction"))?;

    let compute_budget = response
        .compute_budget_instructions
        .iter()
        .map(decode_instruction)
        .collect::<Result<Vec<_>, _>>()?;
    let setup = response
        .setup_instructions
        .iter()
        .map(decode_instruction)
        .collect::<Result<Vec<_>, _>>()?;
    let swap = decode_instruction(swap_raw)?;
    let cleanup = response
        .cleanup_instruction
        .as_ref()
        .map(decode_instruction)
        .transpose()?;
    let lookup_table_keys = response
        .address_lookup_table_addresses
        .iter()
        .map(|key| parse_pubkey("lookup table address", key))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedInstructionSet {
        compute_budget,
        setup,
        swap,
        cleanup,
        lookup_table_keys,
    })
}

fn parse_pubkey(what: &str, raw: &str) -> Result<Pubkey, ComposeError> {
    Pubkey::from_str(raw).map_err(|e| ComposeError::malformed(format!("{what} '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::types::RawAccountMeta;

    fn raw_instruction() -> RawInstruction {
        RawInstruction {
            program_id: Pubkey::new_unique().to_string(),
            accounts: vec![RawAccountMeta {
                pubkey: Pubkey::new_unique().to_string(),
                is_signer: true,
                is_writable: false,
            }],
            data: BASE64_STANDARD.encode([1u8, 2, 3, 4]),
        }
    }

    #[test]
    fn decodes_program_accounts_and_payload() {
        let raw = raw_instruction();
        let ix = decode_instruction(&raw).expect("should decode");
        assert_eq!(ix.program_id.to_string(), raw.program_id);
        assert_eq!(ix.accounts.len(), 1);
        assert!(ix.accounts[0].is_signer);
        assert!(!ix.accounts[0].is_writable);
        assert_eq!(ix.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn rejects_malformed_program_id() {
        let mut raw = raw_instruction();
        raw.program_id = "!!not-base58!!".to_string();
        let err = decode_instruction(&raw).unwrap_err();
        assert!(matches!(err, ComposeError::MalformedInstruction(_)));
    }

    #[test]
    fn rejects_malformed_account_key() {
        let mut raw = raw_instruction();
        raw.accounts[0].pubkey = "short".to_string();
        let err = decode_instruction(&raw).unwrap_err();
        assert!(matches!(err, ComposeError::MalformedInstruction(_)));
    }

    #[test]
    fn rejects_invalid_payload_encoding() {
        let mut raw = raw_instruction();
        raw.data = "%%%".to_string();
        let err = decode_instruction(&raw).unwrap_err();
        assert!(matches!(err, ComposeError::MalformedInstruction(_)));
    }

    #[test]
    fn decodes_full_set_with_groups() {
        let response = SwapInstructionsResponse {
            error: None,
            compute_budget_instructions: vec![raw_instruction(), raw_instruction()],
            setup_instructions: vec![raw_instruction()],
            swap_instruction: Some(raw_instruction()),
            cleanup_instruction: Some(raw_instruction()),
            address_lookup_table_addresses: vec![Pubkey::new_unique().to_string()],
        };
        let decoded = decode_instruction_set(&response).expect("should decode");
        assert_eq!(decoded.compute_budget.len(), 2);
        assert_eq!(decoded.setup.len(), 1);
        assert!(decoded.cleanup.is_some());
        assert_eq!(decoded.lookup_table_keys.len(), 1);
    }

    #[test]
    fn rejects_malformed_lookup_table_address() {
        let response = SwapInstructionsResponse {
            error: None,
            compute_budget_instructions: vec![],
            setup_instructions: vec![],
            swap_instruction: Some(raw_instruction()),
            cleanup_instruction: None,
            address_lookup_table_addresses: vec!["bogus key".to_string()],
        };
        let err = decode_instruction_set(&response).unwrap_err();
        assert!(matches!(err, ComposeError::MalformedInstruction(_)));
    }
}
