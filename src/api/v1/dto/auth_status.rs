use serde::Serialize;

use crate::services::auth::Claims;

#[derive(Debug, Clone, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// Identity as recorded in the access token at issuance time.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub user_id: u64,
    pub google_id: String,
    pub email: String,
    pub name: String,
}

impl From<&Claims> for SessionUser {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            google_id: claims.google_id.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }
}
