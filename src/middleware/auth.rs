//! access token 検証 → AuthCtx を extensions に入れる
//!
//! One enforcer, two modes:
//! - `Mandatory`: any header or token failure ends the request with a 401.
//! - `Optional`: failures leave the request unauthenticated and the handler
//!   still runs.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{Claims, TokenError, TokenService, bearer::extract_bearer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Mandatory,
    Optional,
}

#[derive(Debug, Clone)]
pub struct AuthEnforcer {
    tokens: Arc<TokenService>,
    mode: AuthMode,
}

impl AuthEnforcer {
    pub fn new(tokens: Arc<TokenService>, mode: AuthMode) -> Self {
        Self { tokens, mode }
    }

    /// Decide the request's authentication context from its headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthCtx, AppError> {
        match self.verify(headers) {
            Ok(claims) => Ok(AuthCtx::authenticated(claims)),
            Err(err) => match self.mode {
                AuthMode::Mandatory => {
                    if err == TokenError::MalformedHeader {
                        debug!("request rejected: no bearer credentials");
                    } else {
                        warn!(error = %err, "access token verification failed");
                    }
                    Err(AppError::from(err))
                }
                AuthMode::Optional => {
                    debug!(error = %err, "continuing unauthenticated");
                    Ok(AuthCtx::anonymous())
                }
            },
        }
    }

    fn verify(&self, headers: &HeaderMap) -> Result<Claims, TokenError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(TokenError::MalformedHeader)?;

        let token = extract_bearer(value)?;
        self.tokens.validate_access(token)
    }
}

/// Guard every route of `router` with an enforcer in the given mode.
///
/// 例：
/// ```ignore
/// let status = Router::new().route("/auth/status", get(status));
/// let status = middleware::auth::apply(status, state.tokens.clone(), AuthMode::Optional);
/// ```
pub fn apply<S>(router: Router<S>, tokens: Arc<TokenService>, mode: AuthMode) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // route_layer: unmatched paths still 404 instead of 401
    router.route_layer(middleware::from_fn_with_state(
        AuthEnforcer::new(tokens, mode),
        enforce,
    ))
}

async fn enforce(
    State(enforcer): State<AuthEnforcer>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_ctx = enforcer.authenticate(req.headers())?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
