//! Error taxonomy for the composition pipeline
//!
//! Every composition failure is reported synchronously to the caller with a
//! machine-readable kind and a human-readable detail. Nothing is retried
//! internally: a stale quote or checkpoint must never be reused, so a retry
//! is always a fresh compose-and-sign cycle decided by the caller.

use thiserror::Error;

use crate::aggregator::AggregatorError;

/// Failure of a single composition request
#[derive(Debug, Clone, Error)]
pub enum ComposeError {
    /// Missing or malformed intent fields; surfaced before any network call
    #[error("validation error: {0}")]
    Validation(String),

    /// Aggregator reachable but no viable route exists
    #[error("no viable route for quote: {0}")]
    QuoteUnavailable(String),

    /// Network failure or timeout talking to the aggregator
    #[error("aggregator unreachable: {0}")]
    AggregatorUnreachable(String),

    /// Aggregator protocol failure (non-2xx or malformed body)
    #[error("aggregator error: {0}")]
    Aggregator(String),

    /// Aggregator reported an inline error instead of an instruction set
    #[error("swap instructions unavailable: {0}")]
    InstructionsUnavailable(String),

    /// An instruction descriptor failed to decode; indicates an aggregator
    /// contract violation
    #[error("malformed instruction from aggregator: {0}")]
    MalformedInstruction(String),

    /// Ledger RPC failure at composition time
    #[error("ledger checkpoint unavailable: {0}")]
    CheckpointUnavailable(String),

    /// Instruction ordering or compilation constraint violated
    #[error("transaction assembly failed: {0}")]
    Assembly(String),
}

impl ComposeError {
    /// Machine-readable kind for the caller's error contract
    pub fn kind(&self) -> &'static str {
        match self {
            ComposeError::Validation(_) => "validation",
            ComposeError::QuoteUnavailable(_) => "quote_unavailable",
            ComposeError::AggregatorUnreachable(_) => "aggregator_unreachable",
            ComposeError::Aggregator(_) => "aggregator_error",
            ComposeError::InstructionsUnavailable(_) => "instructions_unavailable",
            ComposeError::MalformedInstruction(_) => "malformed_instruction",
            ComposeError::CheckpointUnavailable(_) => "checkpoint_unavailable",
            ComposeError::Assembly(_) => "assembly_error",
        }
    }

    /// Whether a fresh compose-and-sign cycle might succeed.
    ///
    /// External dependency failures are worth re-invoking; validation and
    /// internal consistency failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ComposeError::QuoteUnavailable(_) => true,
            ComposeError::AggregatorUnreachable(_) => true,
            ComposeError::Aggregator(_) => true,
            ComposeError::InstructionsUnavailable(_) => true,
            ComposeError::CheckpointUnavailable(_) => true,

            ComposeError::Validation(_) => false,
            ComposeError::MalformedInstruction(_) => false,
            ComposeError::Assembly(_) => false,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        ComposeError::MalformedInstruction(reason.into())
    }

    pub fn assembly(reason: impl Into<String>) -> Self {
        ComposeError::Assembly(reason.into())
    }
}

impl From<AggregatorError> for ComposeError {
    fn from(err: AggregatorError) -> Self {
        match err {
            AggregatorError::Unreachable(detail) => ComposeError::AggregatorUnreachable(detail),
            AggregatorError::NoRoute(detail) => ComposeError::QuoteUnavailable(detail),
            AggregatorError::Http { status, detail } => {
                ComposeError::Aggregator(format!("HTTP {status}: {detail}"))
            }
            AggregatorError::Malformed(detail) => ComposeError::Aggregator(detail),
            AggregatorError::InlineError(detail) => ComposeError::InstructionsUnavailable(detail),
        }
    }
}
