use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed `iss` claim for every token this service signs.
pub const ISSUER: &str = "course-management-api";

/// Fixed `aud` entry identifying the mobile client population.
pub const AUDIENCE: &str = "course-management-mobile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity fields copied into every token at issuance time.
///
/// `google_id`, `email` and `name` come from the identity provider after it
/// has verified the user; `user_id` is the internal numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: u64,
    pub google_id: String,
    pub email: String,
    pub name: String,
}

/// Signed token payload.
///
/// Built once by `TokenService` and never mutated afterwards. A presented token
/// is either accepted with all of these fields or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub token_type: TokenKind,

    pub iss: String,
    pub aud: Vec<String>,
    /// Decimal form of `user_id`.
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// Build claims valid from `now` (unix seconds) for `ttl_seconds`.
    pub fn new(
        identity: &Identity,
        kind: TokenKind,
        jti: String,
        now: i64,
        ttl_seconds: u64,
    ) -> Self {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);

        Self {
            user_id: identity.user_id,
            google_id: identity.google_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            token_type: kind,
            iss: ISSUER.to_string(),
            aud: vec![AUDIENCE.to_string()],
            sub: identity.user_id.to_string(),
            jti,
            iat: now,
            nbf: now,
            exp: now.saturating_add(ttl),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            google_id: self.google_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}
