//! Instruction ordering and the reference-carrying fee tip
//!
//! The checkout transaction has a fixed, non-reorderable shape:
//!
//! 1. compute-budget instructions (must precede the costs they bound)
//! 2. setup instructions (create missing token accounts, etc.)
//! 3. the single swap instruction
//! 4. optional cleanup instruction (unwrap/close temporary accounts)
//! 5. the fee-tip transfer, last, carrying the reference key
//!
//! The fee tip is the only place the reference is injected. The reference is
//! appended to the transfer's account list as a non-signing, non-writable
//! extra account, never substituted for an existing one, so a ledger-wide
//! search for the key finds exactly this transaction.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction,
};

use crate::composer::decoder::DecodedInstructionSet;
use crate::composer::errors::ComposeError;

/// Complete ordered instruction list for one checkout transaction
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    pub instructions: Vec<Instruction>,
}

/// Build the fee-tip transfer tagged with the reference key.
///
/// A plain system transfer has two accounts (funding signer, recipient); the
/// reference lands at index 2, readonly and non-signing.
pub fn fee_tip_instruction(
    buyer: &Pubkey,
    recipient: &Pubkey,
    lamports: u64,
    reference: &Pubkey,
) -> Instruction {
    let mut ix = system_instruction::transfer(buyer, recipient, lamports);
    ix.accounts.push(AccountMeta::new_readonly(*reference, false));
    ix
}

/// Assemble the fixed-order instruction list.
pub fn plan_checkout_instructions(
    decoded: DecodedInstructionSet,
    fee_tip: Instruction,
) -> Result<InstructionPlan, ComposeError> {
    if decoded.swap.accounts.is_empty() {
        return Err(ComposeError::assembly("swap instruction has no accounts"));
    }

    let capacity = decoded.compute_budget.len()
        + decoded.setup.len()
        + 1
        + usize::from(decoded.cleanup.is_some())
        + 1;
    let mut instructions = Vec::with_capacity(capacity);

    instructions.extend(decoded.compute_budget);
    instructions.extend(decoded.setup);
    instructions.push(decoded.swap);
    if let Some(cleanup) = decoded.cleanup {
        instructions.push(cleanup);
    }
    instructions.push(fee_tip);

    Ok(InstructionPlan { instructions })
}

/// Verify the reference-placement invariant before compilation.
///
/// The reference key must appear in exactly one instruction: the final fee
/// tip, as an appended non-signing, non-writable account. Violations are
/// assembly errors; they indicate an aggregator instruction already touching
/// the reference, which would make settlement detection ambiguous.
pub fn check_ix_order(
    instructions: &[Instruction],
    reference: &Pubkey,
) -> Result<(), ComposeError> {
    let last = instructions
        .last()
        .ok_or_else(|| ComposeError::assembly("instruction list is empty"))?;

    let mut carrying = 0usize;
    for ix in instructions {
        if ix.accounts.iter().any(|meta| meta.pubkey == *reference) {
            carrying += 1;
        }
    }
    if carrying != 1 {
        return Err(ComposeError::assembly(format!(
            "reference key must appear in exactly one instruction, found {carrying}"
        )));
    }

    let tagged = last
        .accounts
        .iter()
        .find(|meta| meta.pubkey == *reference)
        .ok_or_else(|| {
            ComposeError::assembly("reference key is not carried by the final fee-tip instruction")
        })?;
    if tagged.is_signer || tagged.is_writable {
        return Err(ComposeError::assembly(
            "reference key must be non-signing and non-writable",
        ));
    }
    // a system transfer carries funder + recipient before the appended tag
    if last.accounts.len() < 3 {
        return Err(ComposeError::assembly(
            "fee-tip instruction is missing its transfer accounts",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_program;

    fn opaque_ix(accounts: usize) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1, 2, 3],
            (0..accounts)
                .map(|_| AccountMeta::new(Pubkey::new_unique(), false))
                .collect(),
        )
    }

    fn decoded_set(
        compute_budget: usize,
        setup: usize,
        cleanup: bool,
    ) -> DecodedInstructionSet {
        DecodedInstructionSet {
            compute_budget: (0..compute_budget).map(|_| opaque_ix(1)).collect(),
            setup: (0..setup).map(|_| opaque_ix(1)).collect(),
            swap: opaque_ix(4),
            cleanup: cleanup.then(|| opaque_ix(2)),
            lookup_table_keys: vec![],
        }
    }

    #[test]
    fn fee_tip_appends_reference_readonly_nonsigner() {
        let buyer = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let reference = Pubkey::new_unique();

        let ix = fee_tip_instruction(&buyer, &recipient, 8_000, &reference);

        assert_eq!(ix.program_id, system_program::id());
        assert_eq!(ix.accounts.len(), 3);
        // transfer accounts keep their positions; the tag is appended
        assert_eq!(ix.accounts[0].pubkey, buyer);
        assert_eq!(ix.accounts[1].pubkey, recipient);
        let tag = &ix.accounts[2];
        assert_eq!(tag.pubkey, reference);
        assert!(!tag.is_signer);
        assert!(!tag.is_writable);
    }

    #[test]
    fn plan_orders_groups_with_cleanup() {
        let decoded = decoded_set(2, 3, true);
        let swap_program = decoded.swap.program_id;
        let cleanup_program = decoded.cleanup.as_ref().unwrap().program_id;
        let tip = fee_tip_instruction(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            8_000,
            &Pubkey::new_unique(),
        );

        let plan = plan_checkout_instructions(decoded, tip).unwrap();
        // compute_budget(2) + setup(3) + swap + cleanup + tip
        assert_eq!(plan.instructions.len(), 8);
        assert_eq!(plan.instructions[5].program_id, swap_program);
        assert_eq!(plan.instructions[6].program_id, cleanup_program);
        assert_eq!(plan.instructions[7].program_id, system_program::id());
    }

    #[test]
    fn plan_without_optional_groups() {
        let decoded = decoded_set(0, 0, false);
        let swap_program = decoded.swap.program_id;
        let tip = fee_tip_instruction(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            8_000,
            &Pubkey::new_unique(),
        );
        let plan = plan_checkout_instructions(decoded, tip).unwrap();
        assert_eq!(plan.instructions.len(), 2);
        assert_eq!(plan.instructions[0].program_id, swap_program);
    }

    #[test]
    fn plan_rejects_swap_without_accounts() {
        let mut decoded = decoded_set(0, 0, false);
        decoded.swap.accounts.clear();
        let tip = fee_tip_instruction(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            8_000,
            &Pubkey::new_unique(),
        );
        let err = plan_checkout_instructions(decoded, tip).unwrap_err();
        assert!(matches!(err, ComposeError::Assembly(_)));
    }

    #[test]
    fn order_check_accepts_valid_plan() {
        let reference = Pubkey::new_unique();
        let tip = fee_tip_instruction(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            8_000,
            &reference,
        );
        let plan = plan_checkout_instructions(decoded_set(1, 1, true), tip).unwrap();
        check_ix_order(&plan.instructions, &reference).expect("valid plan");
    }

    #[test]
    fn order_check_rejects_reference_in_two_instructions() {
        let reference = Pubkey::new_unique();
        let mut leaky = opaque_ix(1);
        leaky
            .accounts
            .push(AccountMeta::new_readonly(reference, false));
        let tip = fee_tip_instruction(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            8_000,
            &reference,
        );
        let instructions = vec![leaky, tip];
        let err = check_ix_order(&instructions, &reference).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn order_check_rejects_missing_reference() {
        let instructions = vec![opaque_ix(2), opaque_ix(3)];
        let err = check_ix_order(&instructions, &Pubkey::new_unique()).unwrap_err();
        assert!(matches!(err, ComposeError::Assembly(_)));
    }

    #[test]
    fn order_check_rejects_writable_reference() {
        let reference = Pubkey::new_unique();
        let mut tip = system_instruction::transfer(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            8_000,
        );
        tip.accounts.push(AccountMeta::new(reference, false));
        let instructions = vec![opaque_ix(1), tip];
        let err = check_ix_order(&instructions, &reference).unwrap_err();
        assert!(err.to_string().contains("non-writable"));
    }

    #[test]
    fn order_check_rejects_empty_list() {
        let err = check_ix_order(&[], &Pubkey::new_unique()).unwrap_err();
        assert!(matches!(err, ComposeError::Assembly(_)));
    }
}
