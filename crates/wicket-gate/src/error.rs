//! Error types for the gate.

use thiserror::Error;

/// Why a redemption attempt was refused.
///
/// These never escape a single attempt: each one resolves to a status
/// message and, where applicable, an attempt/lock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Name shorter than three characters after normalization.
    #[error("Please enter a valid full name.")]
    InvalidName,

    /// Code not in the whitelist.
    #[error("Invalid activation code.")]
    InvalidCode,

    /// Code already bound to a different guest.
    #[error("This code is already linked to another guest.")]
    CodeConflict,

    /// Attempts exhausted. Terminal until the store is cleared externally.
    #[error("Access blocked. Too many attempts.")]
    LockedOut,
}

impl Rejection {
    /// Whether this rejection costs one attempt.
    pub const fn consumes_attempt(self) -> bool {
        matches!(self, Self::InvalidCode | Self::CodeConflict)
    }

    /// Stable identifier for logs and serialized commands.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::InvalidCode => "invalid_code",
            Self::CodeConflict => "code_conflict",
            Self::LockedOut => "locked_out",
        }
    }
}

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend refused or failed the operation
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// A value parsed but is out of range
    #[error("{0}")]
    OutOfRange(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_code_failures_cost_attempts() {
        assert!(!Rejection::InvalidName.consumes_attempt());
        assert!(Rejection::InvalidCode.consumes_attempt());
        assert!(Rejection::CodeConflict.consumes_attempt());
        assert!(!Rejection::LockedOut.consumes_attempt());
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(
            Rejection::CodeConflict.to_string(),
            "This code is already linked to another guest."
        );
        assert_eq!(Rejection::InvalidCode.as_str(), "invalid_code");
    }
}
