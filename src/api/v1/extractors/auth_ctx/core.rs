use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::auth::{USER_EMAIL_HEADER, USER_ID_HEADER};

use super::AuthCtx;

/// Handler で AuthCtx を受け取るための extractor
/// gate が identity ヘッダを付与済みである前提
/// 見つからない場合は 401 を返す（保護対象外のパスに置かれた handler など）
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                // gate writes UTF-8 (not only visible ASCII), so no to_str()
                .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
                .map(str::to_string)
        };

        let user_id = header(USER_ID_HEADER)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::Unauthorized)?;
        let email = header(USER_EMAIL_HEADER).filter(|e| !e.is_empty());

        Ok(AuthCtxExtractor(AuthCtx { user_id, email }))
    }
}
