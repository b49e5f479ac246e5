use thiserror::Error;

use crate::config::ConfigError;

/// Request-level failures raised before the engine runs. Business outcomes
/// (no eligible scope, unmet condition, expired promotion) are never errors;
/// they are silent no-effect results, and a missing price is a per-line flag
/// on the quote.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuoteRequestError {
    #[error("cart must contain at least one line")]
    EmptyCart,
    #[error("line `{line_id}` has a non-positive quantity")]
    NonPositiveQuantity { line_id: String },
    #[error("duplicate line id `{line_id}` in one request")]
    DuplicateLineId { line_id: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Request(#[from] QuoteRequestError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("dataset failure: {0}")]
    Dataset(String),
}

impl AppError {
    /// Exit-code class for the CLI: bad input versus operator environment.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Request(_) => 2,
            Self::Config(_) | Self::Dataset(_) => 1,
        }
    }
}
