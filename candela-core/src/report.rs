//! Per-attempt outcome classification and the aggregate failure report.

use core::fmt;

use crate::CandelaError;

/// Classified outcome of a single provider attempt.
///
/// Every failed attempt maps onto exactly one of these buckets so that
/// callers can diagnose "tried 6 providers" situations without parsing
/// error strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Provider does not serve this market, is unregistered, or is
    /// region/feature restricted.
    ProviderUnavailable,
    /// Transport failure or per-request timeout.
    NetworkError,
    /// Provider-level rejection (bad symbol, params, auth).
    ExchangeError,
    /// Zero rows returned with no error.
    EmptyResult,
    /// Anything unclassified.
    UnknownError,
}

impl AttemptOutcome {
    /// Stable label used in report summaries and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "provider_unavailable",
            Self::NetworkError => "network_error",
            Self::ExchangeError => "exchange_error",
            Self::EmptyResult => "empty_result",
            Self::UnknownError => "unknown_error",
        }
    }

    /// Classify a provider-attempt error into an outcome bucket.
    ///
    /// Errors that do not originate from a provider attempt (invalid
    /// arguments, storage failures, nested aggregates) fall through to
    /// `UnknownError` rather than being dropped.
    #[must_use]
    pub const fn classify(err: &CandelaError) -> Self {
        match err {
            CandelaError::ProviderUnavailable { .. } => Self::ProviderUnavailable,
            CandelaError::Network { .. } => Self::NetworkError,
            CandelaError::Exchange { .. } => Self::ExchangeError,
            CandelaError::EmptyResult { .. } => Self::EmptyResult,
            _ => Self::UnknownError,
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One provider attempt within a fallback walk. Transient: attempts exist
/// only to build the aggregate [`FailureReport`] and are never persisted.
#[derive(Debug)]
pub struct FetchAttempt {
    /// Provider identifier, as ranked.
    pub provider: String,
    /// Classified outcome.
    pub outcome: AttemptOutcome,
    /// Human-readable detail for diagnostics.
    pub detail: String,
}

impl FetchAttempt {
    /// Build an attempt record from the error a provider attempt produced.
    #[must_use]
    pub fn from_error(provider: impl Into<String>, err: &CandelaError) -> Self {
        Self {
            provider: provider.into(),
            outcome: AttemptOutcome::classify(err),
            detail: err.to_string(),
        }
    }
}

/// Aggregate of every failed attempt in one fallback walk, in the order
/// the providers were tried.
#[derive(Debug, Default)]
pub struct FailureReport {
    attempts: Vec<FetchAttempt>,
}

impl FailureReport {
    /// Empty report (no providers attempted yet).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    /// Append a failed attempt.
    pub fn push(&mut self, attempt: FetchAttempt) {
        self.attempts.push(attempt);
    }

    /// Attempts in the order the providers were tried.
    #[must_use]
    pub fn attempts(&self) -> &[FetchAttempt] {
        &self.attempts
    }

    /// Whether no provider was attempted at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Number of providers attempted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no providers attempted");
        }
        write!(f, "tried {} providers: ", self.attempts.len())?;
        for (i, a) in self.attempts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", a.provider, a.outcome)?;
        }
        Ok(())
    }
}
