/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - Bearer が必要な範囲 (Mandatory / Optional) をここで決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::auth::{logout, refresh, status};
use crate::middleware::{self, AuthMode};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/auth/refresh", post(refresh));

    let optional = middleware::auth::apply(
        Router::new().route("/auth/status", get(status)),
        state.tokens.clone(),
        AuthMode::Optional,
    );

    let mandatory = middleware::auth::apply(
        Router::new().route("/auth/logout", post(logout)),
        state.tokens.clone(),
        AuthMode::Mandatory,
    );

    public.merge(optional).merge(mandatory)
}
