//! Core error types for OpenCert.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Invalid hex encoding
    #[error("Invalid hex encoding: {input}")]
    InvalidHex {
        /// The offending input
        input: String,
    },

    /// Decoded value has the wrong width
    #[error("Invalid {kind} length: {actual} bytes (expected {expected})")]
    InvalidLength {
        /// What was being decoded
        kind: &'static str,
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Address without the `0x` prefix
    #[error("Address must be 0x-prefixed: {input}")]
    MissingPrefix {
        /// The offending input
        input: String,
    },

    /// Empty issuer identifier
    #[error("Issuer identifier is empty")]
    EmptyIdentifier,

    /// Hash chain without a leaf
    #[error("Hash chain must hold at least its leaf")]
    EmptyChain,

    /// Certificate could not be encoded or decoded
    #[error("Invalid certificate JSON: {message}")]
    InvalidJson {
        /// Underlying serde message
        message: String,
    },
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson {
            message: err.to_string(),
        }
    }
}
