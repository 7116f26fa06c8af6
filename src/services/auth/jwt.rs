//! HMAC sign/verify for session tokens.
//!
//! Time claims are checked against the caller's `now` rather than the system
//! clock inside `jsonwebtoken`, so the service can be driven by an explicit
//! clock.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use tracing::{debug, error};

use crate::services::auth::claims::Claims;
use crate::services::auth::error::TokenError;

/// Algorithm used for every token we sign.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Tokens asserting anything outside the HMAC family are rejected before the
/// signature is looked at, and reported as a signature failure.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

pub fn sign(claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
    if secret.is_empty() {
        error!("refusing to sign JWT with an empty secret");
        return Err(TokenError::Signing);
    }

    let mut header = Header::new(SIGNING_ALGORITHM);
    header.typ = Some("JWT".to_string());

    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(secret)).map_err(|e| {
        error!(error = %e, "failed to sign JWT");
        TokenError::Signing
    })
}

/// Verify `token` against `secret` and return its claims if the signature
/// matches and `nbf <= now <= exp`.
pub fn parse(token: &str, secret: &[u8], now: i64) -> Result<Claims, TokenError> {
    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation())
        .map_err(|e| {
            debug!(error = %e, "JWT decode failed");
            classify(e.kind())
        })?;

    let claims = data.claims;
    check_window(&claims, now)?;

    Ok(claims)
}

fn validation() -> Validation {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
    validation
}

fn check_window(claims: &Claims, now: i64) -> Result<(), TokenError> {
    if claims.exp < claims.iat {
        return Err(TokenError::MalformedToken);
    }
    if now < claims.nbf {
        return Err(TokenError::NotYetValid);
    }
    if now > claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
        _ => TokenError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;
    use crate::services::auth::claims::{Identity, TokenKind};

    const SECRET: &[u8] = b"test-access-secret-very-long-key";
    const NOW: i64 = 1_700_000_000;

    fn claims(ttl: u64) -> Claims {
        let identity = Identity {
            user_id: 7,
            google_id: "google123".to_string(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
        };
        Claims::new(&identity, TokenKind::Access, "jti".to_string(), NOW, ttl)
    }

    fn with_header(token: &str, header_json: &str) -> String {
        let rest = token.split_once('.').unwrap().1;
        format!("{}.{}", URL_SAFE_NO_PAD.encode(header_json), rest)
    }

    #[test]
    fn sign_then_parse_returns_same_claims() {
        let original = claims(3600);
        let token = sign(&original, SECRET).unwrap();

        assert_eq!(parse(&token, SECRET, NOW).unwrap(), original);
    }

    #[test]
    fn signing_is_deterministic() {
        let c = claims(3600);
        assert_eq!(sign(&c, SECRET).unwrap(), sign(&c, SECRET).unwrap());
    }

    #[test]
    fn empty_secret_is_a_signing_error() {
        assert_eq!(sign(&claims(60), b""), Err(TokenError::Signing));
    }

    #[test]
    fn wrong_secret_is_signature_mismatch() {
        let token = sign(&claims(3600), b"secret-A").unwrap();
        assert_eq!(parse(&token, b"secret-B", NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn window_boundaries() {
        let token = sign(&claims(60), SECRET).unwrap();

        assert!(parse(&token, SECRET, NOW + 60).is_ok());
        assert_eq!(parse(&token, SECRET, NOW + 61), Err(TokenError::Expired));
        assert_eq!(parse(&token, SECRET, NOW - 1), Err(TokenError::NotYetValid));
    }

    #[test]
    fn zero_ttl_expires_one_second_later() {
        let token = sign(&claims(0), SECRET).unwrap();

        assert!(parse(&token, SECRET, NOW).is_ok());
        assert_eq!(parse(&token, SECRET, NOW + 1), Err(TokenError::Expired));
    }

    #[test]
    fn non_hmac_algorithm_is_rejected() {
        let token = sign(&claims(3600), SECRET).unwrap();
        let forged = with_header(&token, r#"{"typ":"JWT","alg":"RS256"}"#);

        assert_eq!(parse(&forged, SECRET, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let token = sign(&claims(3600), SECRET).unwrap();
        let forged = with_header(&token, r#"{"typ":"JWT","alg":"none"}"#);

        let err = parse(&forged, SECRET, NOW).unwrap_err();
        assert!(matches!(
            err,
            TokenError::InvalidSignature | TokenError::MalformedToken
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(parse("", SECRET, NOW), Err(TokenError::MalformedToken));
        assert_eq!(parse("invalid-token", SECRET, NOW), Err(TokenError::MalformedToken));
        assert_eq!(parse("a.b.c", SECRET, NOW), Err(TokenError::MalformedToken));
    }

    #[test]
    fn any_single_character_change_is_detected() {
        let token = sign(&claims(3600), SECRET).unwrap();

        let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.";

        for (i, c) in token.char_indices() {
            for replacement in alphabet.chars().filter(|r| *r != c) {
                let mut tampered = token.clone();
                tampered.replace_range(i..i + c.len_utf8(), &replacement.to_string());

                let err = parse(&tampered, SECRET, NOW).unwrap_err();
                assert!(
                    matches!(err, TokenError::InvalidSignature | TokenError::MalformedToken),
                    "position {i}, {c:?} -> {replacement:?}: unexpected {err:?}"
                );
            }
        }
    }
}
