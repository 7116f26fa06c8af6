use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use tracing::error;

use crate::services::auth::error::TokenError;

/// Number of random bytes behind each `jti`.
const TOKEN_ID_BYTES: usize = 16;

/// Source of unique token ids (`jti`).
///
/// Implementations must draw from a CSPRNG and fail rather than fall back to a
/// weaker source.
pub trait TokenIdSource: Send + Sync {
    fn next_id(&self) -> Result<String, TokenError>;
}

/// Token ids from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsTokenIdSource;

impl TokenIdSource for OsTokenIdSource {
    fn next_id(&self) -> Result<String, TokenError> {
        let mut bytes = [0u8; TOKEN_ID_BYTES];
        getrandom::fill(&mut bytes).map_err(|e| {
            error!(error = %e, "getrandom failed while generating token id");
            TokenError::EntropySource
        })?;

        // 16 bytes -> 24 chars, URL-safe base64 with padding.
        Ok(URL_SAFE.encode(bytes))
    }
}
