use thiserror::Error;

/// Failures surfaced by a provider adapter. Adapters tag upstream failures
/// one of two ways and never reinterpret them further.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient upstream failure; the caller may retry.
    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    /// The provider explicitly declined the request; retrying will not help.
    #[error("{provider} rejected the request: {reason}")]
    Rejected { provider: String, reason: String },
}

impl ProviderError {
    pub fn unavailable(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable { provider: provider.into(), reason: reason.to_string() }
    }

    pub fn rejected(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::Rejected { provider: provider.into(), reason: reason.to_string() }
    }
}

/// Amount conversion failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount overflow: {0}")]
    AmountOverflow(String),
}

/// The engine-level failure taxonomy. Every variant carries enough context
/// for the boundary layer to render a specific message.
#[derive(Debug, Error)]
pub enum DefiError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// No positions of the requested kind exist at all. Distinct from an
    /// empty-but-valid wallet balance list.
    #[error("no {kind} positions found on {provider}")]
    EmptyBalance { provider: String, kind: String },

    #[error("provider does not support direct operations: {0}")]
    ProviderNotSupported(String),

    #[error("operation not supported: {0}")]
    OperationNotSupported(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Amount(#[from] AmountError),
}
