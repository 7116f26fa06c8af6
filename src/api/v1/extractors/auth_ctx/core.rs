use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::{AuthCtx, CurrentUser};

/// Handler で AuthCtx を受け取るための extractor
/// enforcer が動いていない route では未認証の AuthCtx を返す
impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .unwrap_or_else(AuthCtx::anonymous))
    }
}

/// 認証済みの呼び出し元が必要な handler 用
/// 見つからない・未認証の場合は 401 を返す
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .and_then(|ctx| ctx.claims.clone())
            .map(CurrentUser)
            .ok_or(AppError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::services::auth::{Claims, Identity, TokenKind};

    fn claims() -> Claims {
        let identity = Identity {
            user_id: 42,
            google_id: "g".to_string(),
            email: "e@x.com".to_string(),
            name: "N".to_string(),
        };
        Claims::new(&identity, TokenKind::Access, "jti".to_string(), 0, 60)
    }

    fn parts_with(ctx: Option<AuthCtx>) -> Parts {
        let mut req = Request::new(());
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    #[tokio::test]
    async fn missing_context_reads_as_anonymous() {
        let mut parts = parts_with(None);
        let ctx = AuthCtx::from_request_parts(&mut parts, &()).await.unwrap();

        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.user_id(), None);
    }

    #[tokio::test]
    async fn current_user_requires_authentication() {
        let mut parts = parts_with(Some(AuthCtx::anonymous()));
        assert!(matches!(
            CurrentUser::from_request_parts(&mut parts, &()).await,
            Err(AppError::AuthenticationRequired)
        ));

        let mut parts = parts_with(Some(AuthCtx::authenticated(claims())));
        let user = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id(), 42);
        assert_eq!(user.claims().jti, "jti");
    }
}
