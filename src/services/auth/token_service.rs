use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::services::auth::claims::{Claims, ISSUER, Identity, TokenKind};
use crate::services::auth::error::TokenError;
use crate::services::auth::jwt;
use crate::services::auth::token_id::{OsTokenIdSource, TokenIdSource};

pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 60 * 60;
pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Secrets and lifetimes for the two token kinds.
///
/// Built once at startup; `TokenService` only ever reads it.
#[derive(Clone)]
pub struct TokenSettings {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

impl TokenSettings {
    /// Settings with the default lifetimes (1 hour access, 7 days refresh).
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    pub fn with_ttls(mut self, access_ttl_seconds: u64, refresh_ttl_seconds: u64) -> Self {
        self.access_ttl_seconds = access_ttl_seconds;
        self.refresh_ttl_seconds = refresh_ttl_seconds;
        self
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenSettings")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish_non_exhaustive()
    }
}

/// Service-level return type to keep handlers thin.
///
/// Handlers map this into the HTTP DTO (TokenResponse).
#[derive(Clone, Debug)]
pub struct IssuedTokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Issues, validates and rotates signed access/refresh token pairs.
///
/// - Access and refresh tokens are signed with separate secrets.
/// - Validation is stateless: nothing is persisted, and a refreshed pair does
///   not invalidate the refresh token it was minted from.
#[derive(Clone)]
pub struct TokenService {
    settings: TokenSettings,
    ids: Arc<dyn TokenIdSource>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(settings: TokenSettings) -> Self {
        Self::with_id_source(settings, Arc::new(OsTokenIdSource))
    }

    pub fn with_id_source(settings: TokenSettings, ids: Arc<dyn TokenIdSource>) -> Self {
        if settings.access_secret == settings.refresh_secret {
            warn!("access and refresh tokens share a secret; only the token_type claim separates them");
        }
        Self { settings, ids }
    }

    /// Issue a new token pair for an identity that has already been verified.
    pub fn issue_pair(&self, identity: &Identity) -> Result<IssuedTokenPair, TokenError> {
        self.issue_pair_at(identity, Utc::now())
    }

    /// Same as [`issue_pair`](Self::issue_pair) with an explicit clock value.
    ///
    /// The access token is built first; if either token cannot be built no
    /// pair is returned.
    pub fn issue_pair_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<IssuedTokenPair, TokenError> {
        let now = now.timestamp();

        let access_token = self.issue(identity, TokenKind::Access, now)?;
        let refresh_token = self.issue(identity, TokenKind::Refresh, now)?;

        debug!(user_id = identity.user_id, "issued token pair");

        Ok(IssuedTokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.settings.access_ttl_seconds,
        })
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_access_at(token, Utc::now())
    }

    pub fn validate_access_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.validate(token, TokenKind::Access, now)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_refresh_at(token, Utc::now())
    }

    pub fn validate_refresh_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        self.validate(token, TokenKind::Refresh, now)
    }

    /// Exchange a refresh token for a brand-new pair carrying the same identity.
    pub fn refresh_pair(&self, refresh_token: &str) -> Result<IssuedTokenPair, TokenError> {
        self.refresh_pair_at(refresh_token, Utc::now())
    }

    pub fn refresh_pair_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedTokenPair, TokenError> {
        let claims = self.validate_refresh_at(refresh_token, now)?;

        debug!(user_id = claims.user_id, jti = %claims.jti, "refreshing token pair");

        self.issue_pair_at(&claims.identity(), now)
    }

    fn issue(&self, identity: &Identity, kind: TokenKind, now: i64) -> Result<String, TokenError> {
        let jti = self.ids.next_id().inspect_err(|e| {
            error!(user_id = identity.user_id, kind = %kind, error = %e, "failed to generate token id");
        })?;

        let claims = Claims::new(identity, kind, jti, now, self.ttl_for(kind));
        jwt::sign(&claims, self.secret_for(kind))
    }

    fn validate(&self, token: &str, expected: TokenKind, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = jwt::parse(token, self.secret_for(expected), now.timestamp())?;

        // The signature already binds the kind when secrets differ; this also
        // covers a shared-secret setup.
        if claims.token_type != expected {
            return Err(TokenError::WrongTokenKind {
                expected,
                found: claims.token_type,
            });
        }

        if claims.iss != ISSUER {
            return Err(TokenError::WrongIssuer);
        }

        Ok(claims)
    }

    fn secret_for(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.settings.access_secret,
            TokenKind::Refresh => &self.settings.refresh_secret,
        }
    }

    fn ttl_for(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.settings.access_ttl_seconds,
            TokenKind::Refresh => self.settings.refresh_ttl_seconds,
        }
    }
}
