/*
 * Responsibility
 * - Handler から見える「認証コンテキスト」の型
 * - AuthEnforcer が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - optional ルートでは未認証 (authenticated = false) の AuthCtx も格納される
 */
use std::sync::Arc;

use crate::services::auth::Claims;

/// Per-request authentication state published by the enforcer.
///
/// Authenticated iff it carries claims; there is no way to build one that says
/// authenticated without the claims that prove it.
#[derive(Debug, Clone, Default)]
pub struct AuthCtx {
    pub(super) claims: Option<Arc<Claims>>,
}

impl AuthCtx {
    pub fn authenticated(claims: Claims) -> Self {
        Self {
            claims: Some(Arc::new(claims)),
        }
    }

    pub fn anonymous() -> Self {
        Self { claims: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    /// Internal numeric user id of the authenticated caller.
    pub fn user_id(&self) -> Option<u64> {
        self.claims.as_deref().map(|c| c.user_id)
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_deref()
    }
}

/// Authenticated caller; only extractable behind a mandatory enforcer (or an
/// optional one that succeeded).
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<Claims>);

impl CurrentUser {
    pub fn user_id(&self) -> u64 {
        self.0.user_id
    }

    pub fn claims(&self) -> &Claims {
        &self.0
    }
}
