/*
 * Responsibility
 * - /auth 系 handler (refresh / status / logout)
 * - 検証は TokenService と AuthEnforcer に任せ、handler は DTO 変換のみ
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    api::v1::dto::{
        auth_status::{AuthStatusResponse, SessionUser},
        refresh_request::RefreshRequest,
        token_response::TokenResponse,
    },
    api::v1::extractors::{AuthCtx, CurrentUser},
    error::AppError,
    state::AppState,
};

pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = body.map_err(|_| AppError::bad_request("invalid request format"))?;

    if req.refresh_token.is_empty() {
        return Err(AppError::bad_request("refresh_token is required"));
    }

    let pair = state.tokens.refresh_pair(&req.refresh_token).map_err(|e| {
        if e.is_fatal() {
            error!(error = %e, "failed to issue refreshed token pair");
        }
        AppError::from(e)
    })?;

    Ok(Json(pair.into()))
}

pub async fn status(auth: AuthCtx) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: auth.is_authenticated(),
        user: auth.claims().map(SessionUser::from),
    })
}

/// Tokens stay valid until they expire; the client is expected to discard them.
pub async fn logout(user: CurrentUser) -> Json<Value> {
    info!(user_id = user.user_id(), jti = %user.claims().jti, "user logged out");

    Json(json!({ "message": "Successfully logged out" }))
}
