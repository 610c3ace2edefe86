//! Swap aggregator client supercomponent
//!
//! Talks to the external liquidity aggregator over HTTP: one exact-output
//! quote call, one swap-instructions call. The quote body is opaque to this
//! system and is re-submitted verbatim; the instruction descriptors are the
//! raw transport shape handed to the decoder.

pub mod client;
pub mod errors;
pub mod types;

pub use client::AggregatorClient;
pub use errors::AggregatorError;
pub use types::{Quote, RawAccountMeta, RawInstruction, SwapInstructionsResponse};
