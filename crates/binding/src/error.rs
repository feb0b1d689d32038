use ethers::types::H256;
use thiserror::Error;

/// Error taxonomy for the binding layer.
///
/// Every variant is surfaced to the caller immediately; nothing is retried
/// here. Retry and backpressure policy belongs to the caller or an outer
/// layer.
#[derive(Debug, Error)]
pub enum BindingError {
    /// An argument did not match the descriptor's declared shape or width.
    /// Raised locally, before anything reaches the network.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The chain client reported a transport failure or an on-chain revert.
    /// The cause is forwarded opaquely from the client.
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// Returned bytes did not match the descriptor's declared output shape.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A log's first topic matched no event signature known to the contract.
    #[error("unrecognized event topic {0:?}")]
    UnrecognizedEvent(H256),

    /// A log carried fewer topics or less data than its descriptor requires.
    #[error("truncated log: {0}")]
    TruncatedLog(String),

    /// A state-mutating call was attempted on a query-only binding, or a
    /// function was dispatched through the wrong path for its mutability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Any other error with its source
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BindingError {
    /// Create a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        BindingError::Encoding(msg.into())
    }

    /// Create a new remote-call error
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        BindingError::RemoteCall(msg.into())
    }

    /// Create a new decoding error
    pub fn decoding<S: Into<String>>(msg: S) -> Self {
        BindingError::Decoding(msg.into())
    }

    /// Create a new truncated-log error
    pub fn truncated<S: Into<String>>(msg: S) -> Self {
        BindingError::TruncatedLog(msg.into())
    }

    /// Create a new unsupported-operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        BindingError::UnsupportedOperation(msg.into())
    }
}

/// Result type for the binding layer
pub type Result<T> = std::result::Result<T, BindingError>;
