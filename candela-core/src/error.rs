//! Unified error type for the candela workspace.

use thiserror::Error;

use crate::report::FailureReport;

/// Unified error type for the candela workspace.
///
/// Provider-scoped variants mirror the attempt taxonomy used by the fetch
/// orchestrator (`provider_unavailable`, `network_error`, `exchange_error`,
/// `empty_result`, `unknown_error`); the remaining variants cover local
/// validation, data, and storage failures.
#[derive(Debug, Error)]
pub enum CandelaError {
    /// The provider does not serve OHLCV for the requested market, is not
    /// registered, or is restricted in this region.
    #[error("{provider} unavailable: {msg}")]
    ProviderUnavailable {
        /// Provider identifier.
        provider: String,
        /// Why the provider cannot serve this request.
        msg: String,
    },

    /// Transport or connectivity failure, including per-request timeouts.
    #[error("network failure via {provider}: {msg}")]
    Network {
        /// Provider identifier.
        provider: String,
        /// Human-readable transport error.
        msg: String,
    },

    /// The provider understood the request and rejected it (bad symbol,
    /// malformed parameters, authentication).
    #[error("{provider} rejected the request: {msg}")]
    Exchange {
        /// Provider identifier.
        provider: String,
        /// Provider-level rejection message.
        msg: String,
    },

    /// The provider answered successfully but returned zero rows. Treated
    /// as a failure so the orchestrator moves on to the next provider.
    #[error("{provider} returned no rows")]
    EmptyResult {
        /// Provider identifier.
        provider: String,
    },

    /// Unclassified provider failure.
    #[error("unknown error from {provider}: {msg}")]
    Unknown {
        /// Provider identifier.
        provider: String,
        /// Whatever detail is available.
        msg: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with returned or stored data (non-finite fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Local persistence failure (series store or ranking cache).
    #[error("storage failure: {0}")]
    Storage(String),

    /// Every ranked provider was tried without success; contains one
    /// classified attempt per provider, in the order tried.
    #[error("all providers failed: {0}")]
    AllProvidersFailed(FailureReport),
}

impl CandelaError {
    /// Helper: build a `ProviderUnavailable` error.
    pub fn provider_unavailable(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Network` error.
    pub fn network(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Exchange` error.
    pub fn exchange(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Exchange {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `EmptyResult` error.
    pub fn empty_result(provider: impl Into<String>) -> Self {
        Self::EmptyResult {
            provider: provider.into(),
        }
    }

    /// Helper: build an `Unknown` error.
    pub fn unknown(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Unknown {
            provider: provider.into(),
            msg: msg.into(),
        }
    }
}

impl From<std::io::Error> for CandelaError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CandelaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
