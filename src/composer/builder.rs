//! Transaction composer
//!
//! Orchestrates one checkout composition: quote the swap, fetch the
//! instruction set, decode it, resolve lookup tables and a recent checkpoint
//! concurrently, order everything with the reference-carrying fee tip last,
//! compile one versioned message against the resolved tables, and seal the
//! unsigned transaction for the external wallet.
//!
//! Composition is a linear pipeline per checkout with no shared mutable
//! state; concurrent checkouts never interact. Composing twice from the same
//! inputs and checkpoint yields byte-identical output; a newer checkpoint
//! yields different bytes and is never an error.

use std::sync::Arc;

use tracing::{debug, info};

use solana_sdk::{
    message::{v0::Message as MessageV0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

use crate::aggregator::AggregatorClient;
use crate::composer::decoder::decode_instruction_set;
use crate::composer::errors::ComposeError;
use crate::composer::instructions::{
    check_ix_order, fee_tip_instruction, plan_checkout_instructions,
};
use crate::composer::lookup::resolve_lookup_tables;
use crate::composer::output::ComposedTransaction;
use crate::intent::PaymentIntent;
use crate::ledger::LedgerRpc;

/// Composer policy: the knobs that were ambient constants in earlier
/// incarnations, made explicit per instance.
#[derive(Debug, Clone)]
pub struct ComposerPolicy {
    /// Lamports moved by the fee-tip transfer
    pub fee_tip_lamports: u64,

    /// Operator account receiving the tip
    pub fee_tip_recipient: Pubkey,

    /// Message returned alongside the transaction
    pub message: String,
}

/// Composes one signable checkout transaction per payment intent
pub struct TransactionComposer {
    rpc: Arc<dyn LedgerRpc>,
    aggregator: AggregatorClient,
    policy: ComposerPolicy,
}

impl TransactionComposer {
    pub fn new(
        rpc: Arc<dyn LedgerRpc>,
        aggregator: AggregatorClient,
        policy: ComposerPolicy,
    ) -> Self {
        Self {
            rpc,
            aggregator,
            policy,
        }
    }

    /// Compose the full checkout transaction for a validated intent.
    ///
    /// # Errors
    /// Every failure carries a machine-readable kind (see `ComposeError`);
    /// none are retried here. External-dependency failures mean the caller
    /// may start a fresh composition; a stale quote or checkpoint is never
    /// reused.
    pub async fn compose(
        &self,
        intent: &PaymentIntent,
    ) -> Result<ComposedTransaction, ComposeError> {
        let quote = self
            .aggregator
            .quote(
                &intent.input_mint,
                &intent.settlement_mint,
                intent.amount_minor_units,
            )
            .await?;

        let destination = intent.settlement_account();
        let raw_instructions = self
            .aggregator
            .swap_instructions(&quote, &intent.buyer, &destination)
            .await?;

        // decoding is pure; it runs before the I/O pair below
        let decoded = decode_instruction_set(&raw_instructions)?;
        let lookup_keys = decoded.lookup_table_keys.clone();

        // checkpoint fetch and table resolution are independent
        let (blockhash, tables) = tokio::try_join!(
            async {
                self.rpc
                    .latest_blockhash()
                    .await
                    .map_err(|e| ComposeError::CheckpointUnavailable(e.to_string()))
            },
            resolve_lookup_tables(self.rpc.as_ref(), &lookup_keys),
        )?;

        let fee_tip = fee_tip_instruction(
            &intent.buyer,
            &self.policy.fee_tip_recipient,
            self.policy.fee_tip_lamports,
            &intent.reference,
        );
        let plan = plan_checkout_instructions(decoded, fee_tip)?;
        check_ix_order(&plan.instructions, &intent.reference)?;

        let message = MessageV0::try_compile(
            &intent.buyer,
            &plan.instructions,
            &tables,
            blockhash,
        )
        .map_err(|e| ComposeError::assembly(format!("message compilation: {e}")))?;
        let message = VersionedMessage::V0(message);

        // unsigned: the wallet signs externally, custody stays outside
        let required = message.header().num_required_signatures as usize;
        let transaction = VersionedTransaction {
            signatures: vec![Signature::default(); required],
            message,
        };

        debug!(
            reference = %intent.reference,
            instructions = plan.instructions.len(),
            tables = tables.len(),
            "checkout transaction compiled"
        );

        let sealed = ComposedTransaction::seal(
            &transaction,
            intent.reference,
            self.policy.message.clone(),
            plan.instructions.len(),
            tables.len(),
        )?;

        info!(
            reference = %intent.reference,
            amount = intent.amount_minor_units,
            "checkout transaction composed"
        );
        Ok(sealed)
    }
}
