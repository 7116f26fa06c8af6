use thiserror::Error;

use crate::services::auth::claims::TokenKind;

/// Failures produced while extracting, issuing or validating session tokens.
///
/// Validation failures are client faults and end up as a 401; `EntropySource`
/// and `Signing` are server faults (see [`TokenError::is_fatal`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing or malformed authorization header")]
    MalformedHeader,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("wrong token kind: expected {expected}, found {found}")]
    WrongTokenKind { expected: TokenKind, found: TokenKind },

    #[error("wrong token issuer")]
    WrongIssuer,

    #[error("entropy source unavailable")]
    EntropySource,

    #[error("failed to sign token")]
    Signing,
}

impl TokenError {
    /// True for failures on the issuing side that the client cannot fix.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EntropySource | Self::Signing)
    }
}
