//! Error taxonomy of the manager.
//!
//! - [`ChainConnectionError`]: the session is missing or could not be set up.
//!   Fatal for the attempted operation and never retried silently.
//! - [`QueryDegradation`]: a read failed. The query layer logs it and returns
//!   a default; it is never propagated.
//! - [`ExtrinsicFailure`]: the chain rejected a call or it failed in transit.
//! - [`PreconditionFailure`]: a local check failed before anything was sent.

use crate::utils::balance_newtypes::Rao;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used whenever an operation runs without a live session.
pub const NOT_CONNECTED_MESSAGE: &str = "Not connected. Call connect() first.";

// =============================================================================
// Chain/Network Errors
// =============================================================================

/// Error when the chain session is absent or connecting failed
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Chain connection error: {message}")]
pub struct ChainConnectionError {
    pub message: String,
    /// The RPC URL that failed to connect
    pub rpc_url: Option<String>,
}

impl ChainConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rpc_url: None,
        }
    }

    pub fn with_url(message: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rpc_url: Some(rpc_url.into()),
        }
    }

    pub fn not_connected() -> Self {
        Self::new(NOT_CONNECTED_MESSAGE)
    }

    pub fn is_not_connected(&self) -> bool {
        self.message == NOT_CONNECTED_MESSAGE
    }
}

/// A failed read, recorded and replaced by a default value
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Query degraded ({source_name}): {message}")]
pub struct QueryDegradation {
    /// `Module.Entry` or `RuntimeApi.method` that failed
    pub source_name: String,
    pub message: String,
}

impl QueryDegradation {
    pub fn new(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Transaction Errors
// =============================================================================

/// An extrinsic rejected by the chain or lost in transit
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Extrinsic {pallet}.{call} failed: {message}")]
pub struct ExtrinsicFailure {
    pub message: String,
    pub pallet: String,
    pub call: String,
}

impl ExtrinsicFailure {
    pub fn new(
        message: impl Into<String>,
        pallet: impl Into<String>,
        call: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            pallet: pallet.into(),
            call: call.into(),
        }
    }
}

/// A local check that blocked a submission
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("{message}")]
pub struct PreconditionFailure {
    pub message: String,
    pub required: Option<Rao>,
    pub available: Option<Rao>,
}

impl PreconditionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            required: None,
            available: None,
        }
    }

    /// Free balance below what the operation needs.
    pub fn insufficient_balance(available: Rao, required: Rao, what: &str) -> Self {
        Self {
            message: format!(
                "Insufficient balance: {:.9} TAO < {:.9} TAO {}",
                available.as_tao(),
                required.as_tao(),
                what
            ),
            required: Some(required),
            available: Some(available),
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

#[derive(Debug, Error)]
pub enum BtManagerError {
    #[error(transparent)]
    ChainConnection(#[from] ChainConnectionError),
    #[error(transparent)]
    Extrinsic(#[from] ExtrinsicFailure),
    #[error(transparent)]
    Precondition(#[from] PreconditionFailure),
    #[error(transparent)]
    Chain(#[from] crate::chain::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl BtManagerError {
    pub fn config(err: impl std::fmt::Display) -> Self {
        BtManagerError::Config(err.to_string())
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(self, BtManagerError::ChainConnection(_))
    }

    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, BtManagerError::Precondition(_))
    }
}

pub type BtManagerResult<T> = Result<T, BtManagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_message_is_fixed() {
        let err = ChainConnectionError::not_connected();
        assert!(err.is_not_connected());
        assert_eq!(
            err.to_string(),
            "Chain connection error: Not connected. Call connect() first."
        );
    }

    #[test]
    fn test_connection_error_with_url() {
        let err = ChainConnectionError::with_url("refused", "ws://127.0.0.1:9944");
        assert_eq!(err.rpc_url.as_deref(), Some("ws://127.0.0.1:9944"));
        assert!(!err.is_not_connected());
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = PreconditionFailure::insufficient_balance(
            Rao(500_000_000),
            Rao(1_000_000_000),
            "burn cost",
        );
        assert_eq!(
            err.to_string(),
            "Insufficient balance: 0.500000000 TAO < 1.000000000 TAO burn cost"
        );
        assert_eq!(err.required, Some(Rao(1_000_000_000)));
    }

    #[test]
    fn test_unified_error_conversions() {
        let err: BtManagerError = ChainConnectionError::not_connected().into();
        assert!(err.is_connection_error());
        let err: BtManagerError = PreconditionFailure::new("nope").into();
        assert!(err.is_precondition_failure());
        assert_eq!(err.to_string(), "nope");
        let err = BtManagerError::config("missing field");
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_degradation_display() {
        let d = QueryDegradation::new("SubnetInfoRuntimeApi.get_all_dynamic_info", "timeout");
        assert_eq!(
            d.to_string(),
            "Query degraded (SubnetInfoRuntimeApi.get_all_dynamic_info): timeout"
        );
    }
}
