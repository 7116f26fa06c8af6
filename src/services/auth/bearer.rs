use crate::services::auth::error::TokenError;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-sensitively and must be followed by at least one
/// character.
pub fn extract_bearer(header_value: &str) -> Result<&str, TokenError> {
    match header_value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::MalformedHeader),
    }
}
