//! # Service Errors
//!
//! Error surface of the async order service: engine failures pass through
//! unchanged, collaborator failures become retryable `Upstream` notices.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation / Stock   → block the mutation, show the specific reason   │
//! │  Below-cost           → NOT an error: RequiresConfirmation outcome     │
//! │  History              → user-correctable notice (no prior order, ...)  │
//! │  Upstream             → retryable; engine state is left untouched      │
//! │                                                                         │
//! │  Exception: the last-purchase-price fetch degrades SILENTLY to         │
//! │  NoCostData (cost warnings become unavailable, adds keep working).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use meridian_core::error::{EngineError, HistoryError, StockError, ValidationError};

use crate::sources::SourceError;

/// Errors surfaced by [`crate::service::OrderService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Engine-level failure (validation, stock, history).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A collaborator call failed. Engine state was not modified; the
    /// operation can be retried as-is.
    #[error("{operation} failed upstream: {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: SourceError,
    },
}

impl ServiceError {
    /// Wraps a collaborator failure with the failing operation's name.
    pub fn upstream(operation: &'static str, source: SourceError) -> Self {
        ServiceError::Upstream { operation, source }
    }

    /// True when retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Upstream { .. })
    }
}

// thiserror's #[from] does not chain conversions, so the engine sub-errors
// get explicit lifts for ? ergonomics at the service layer.

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Engine(err.into())
    }
}

impl From<StockError> for ServiceError {
    fn from(err: StockError) -> Self {
        ServiceError::Engine(err.into())
    }
}

impl From<HistoryError> for ServiceError {
    fn from(err: HistoryError) -> Self {
        ServiceError::Engine(err.into())
    }
}

/// Convenience type alias for Results with ServiceError.
pub type ServiceResult<T> = Result<T, ServiceError>;
