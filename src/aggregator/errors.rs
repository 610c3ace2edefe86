//! Aggregator client error taxonomy

use thiserror::Error;

/// Failures talking to the swap aggregator
#[derive(Debug, Clone, Error)]
pub enum AggregatorError {
    /// Network failure or timeout before a response was received
    #[error("aggregator unreachable: {0}")]
    Unreachable(String),

    /// Aggregator reachable but reported no viable route for the pair/amount
    #[error("no viable swap route: {0}")]
    NoRoute(String),

    /// Non-2xx response that is not a route failure
    #[error("aggregator returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// 2xx response whose body could not be interpreted
    #[error("malformed aggregator response: {0}")]
    Malformed(String),

    /// Inline `error` field on an otherwise successful response
    #[error("aggregator reported instruction error: {0}")]
    InlineError(String),
}

impl AggregatorError {
    /// Whether re-invoking the whole composition might succeed.
    ///
    /// Retrying is always a caller-level decision; nothing inside the
    /// pipeline retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            AggregatorError::Unreachable(_) => true,
            AggregatorError::Http { status, .. } => *status >= 500,
            AggregatorError::NoRoute(_) => false,
            AggregatorError::Malformed(_) => false,
            AggregatorError::InlineError(_) => false,
        }
    }
}
