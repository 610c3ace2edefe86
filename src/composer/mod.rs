//! Transaction composer supercomponent
//!
//! Turns a validated payment intent plus aggregator-supplied swap
//! instructions into one signable, serialized, versioned ledger transaction.
//!
//! The supercomponent is split into focused modules:
//! - **errors**: composition error taxonomy with machine-readable kinds
//! - **decoder**: opaque descriptors to ledger-native instructions
//! - **lookup**: batched lookup-table resolution
//! - **instructions**: fixed ordering and the reference-carrying fee tip
//! - **output**: sealed, base64-encoded unsigned transaction
//! - **builder**: the composition pipeline itself

pub mod builder;
pub mod decoder;
pub mod errors;
pub mod instructions;
pub mod lookup;
pub mod output;

pub use builder::{ComposerPolicy, TransactionComposer};
pub use decoder::{decode_instruction, decode_instruction_set, DecodedInstructionSet};
pub use errors::ComposeError;
pub use instructions::{check_ix_order, fee_tip_instruction, plan_checkout_instructions, InstructionPlan};
pub use lookup::resolve_lookup_tables;
pub use output::ComposedTransaction;
