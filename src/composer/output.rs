//! Composed transaction output
//!
//! The final artifact of a composition: one unsigned versioned transaction,
//! serialized and base64-encoded for transport to the external wallet. It is
//! immutable once sealed and has no identity beyond its bytes; signing and
//! broadcast happen outside this system.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Serialize;

use solana_sdk::{pubkey::Pubkey, transaction::VersionedTransaction};

use crate::composer::errors::ComposeError;

/// Sealed output of one successful composition
#[derive(Debug, Clone, Serialize)]
pub struct ComposedTransaction {
    /// The reference key the watcher will look for
    pub reference: Pubkey,

    /// Unsigned versioned transaction, bincode-serialized then base64-encoded
    pub transaction_base64: String,

    /// Human-readable message shown by the wallet
    pub message: String,

    /// Number of instructions in the compiled message
    pub instruction_count: usize,

    /// Number of lookup tables compiled against
    pub resolved_tables: usize,
}

impl ComposedTransaction {
    /// Serialize and encode a compiled transaction.
    pub fn seal(
        transaction: &VersionedTransaction,
        reference: Pubkey,
        message: String,
        instruction_count: usize,
        resolved_tables: usize,
    ) -> Result<Self, ComposeError> {
        let bytes = bincode::serialize(transaction)
            .map_err(|e| ComposeError::assembly(format!("transaction serialization: {e}")))?;
        Ok(Self {
            reference,
            transaction_base64: BASE64_STANDARD.encode(bytes),
            message,
            instruction_count,
            resolved_tables,
        })
    }

    /// Decode back into a transaction (used by callers that inspect the
    /// artifact, and by tests).
    pub fn decode(&self) -> Result<VersionedTransaction, ComposeError> {
        let bytes = BASE64_STANDARD
            .decode(&self.transaction_base64)
            .map_err(|e| ComposeError::assembly(format!("transaction encoding: {e}")))?;
        bincode::deserialize(&bytes)
            .map_err(|e| ComposeError::assembly(format!("transaction deserialization: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::{v0::Message as MessageV0, VersionedMessage},
        signature::Signature,
    };

    fn unsigned_transaction() -> VersionedTransaction {
        let payer = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[9, 9, 9],
            vec![AccountMeta::new(payer, true)],
        );
        let message = MessageV0::try_compile(&payer, &[ix], &[], Hash::default()).unwrap();
        let message = VersionedMessage::V0(message);
        let required = message.header().num_required_signatures as usize;
        VersionedTransaction {
            signatures: vec![Signature::default(); required],
            message,
        }
    }

    #[test]
    fn seal_and_decode_round_trip() {
        let tx = unsigned_transaction();
        let sealed = ComposedTransaction::seal(
            &tx,
            Pubkey::new_unique(),
            "Thank you for your purchase!".to_string(),
            1,
            0,
        )
        .unwrap();
        let decoded = sealed.decode().unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(sealed.instruction_count, 1);
    }

    #[test]
    fn sealing_is_deterministic() {
        let tx = unsigned_transaction();
        let a = ComposedTransaction::seal(&tx, Pubkey::new_unique(), "m".into(), 1, 0).unwrap();
        let b = ComposedTransaction::seal(&tx, Pubkey::new_unique(), "m".into(), 1, 0).unwrap();
        assert_eq!(a.transaction_base64, b.transaction_base64);
    }

    #[test]
    fn sealed_transaction_carries_no_real_signatures() {
        let tx = unsigned_transaction();
        let sealed =
            ComposedTransaction::seal(&tx, Pubkey::new_unique(), "m".into(), 1, 0).unwrap();
        let decoded = sealed.decode().unwrap();
        assert!(decoded.signatures.iter().all(|s| *s == Signature::default()));
    }
}
