//! Bearer token gate: 検証 → identity ヘッダ付与 → 下流へ
//!
//! - 保護対象 prefix (`ProtectedRoutes`) 以外は素通し (default-deny はしない)
//! - `Authorization: Bearer <token>` を IdentityVerifier で検証する
//! - 成功時は `x-user-id` / `x-user-email` を付け替えて next へ (body は触らない)
//! - 失敗時は 401 + `{"error": "..."}`。理由はログにだけ残す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AuthRejection;
use crate::services::identity::{DecodedIdentity, VerifyError};
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Router 全体に gate を掛ける。
///
/// nest 後の Router に掛けるので、prefix 判定はフルパスで行える。
/// ```ignore
/// let router = middleware::auth::gate::apply(router, state.clone());
/// ```
pub fn apply(router: Router, state: AppState) -> Router {
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

async fn gate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    if !state.protected_routes.matches(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers()).ok_or(AuthRejection::CredentialMissing)?;

    let identity = match state.verifier.verify(token).await {
        Ok(identity) => identity,
        Err(VerifyError::Rejected(reason)) => {
            tracing::warn!(error = %reason, "bearer token rejected");
            return Err(AuthRejection::CredentialInvalid);
        }
        Err(VerifyError::Unavailable(err)) => {
            tracing::error!(error = %err, "identity verifier fault");
            return Err(AuthRejection::VerifierFault);
        }
    };

    let (user_id, email) = identity_headers(&identity).ok_or_else(|| {
        tracing::warn!(
            subject_id = %identity.subject_id,
            "verified identity is not representable as header values"
        );
        AuthRejection::CredentialInvalid
    })?;

    // Overwrite whatever the client sent under these names.
    let headers = req.headers_mut();
    headers.insert(USER_ID_HEADER, user_id);
    headers.insert(USER_EMAIL_HEADER, email);

    tracing::debug!(subject_id = %identity.subject_id, "request authenticated");

    Ok(next.run(req).await)
}

/// Text after `Bearer ` (up to any further `Bearer `); empty means absent.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    value.split("Bearer ").nth(1).filter(|token| !token.is_empty())
}

fn identity_headers(identity: &DecodedIdentity) -> Option<(HeaderValue, HeaderValue)> {
    let user_id = HeaderValue::from_bytes(identity.subject_id.as_bytes()).ok()?;
    let email =
        HeaderValue::from_bytes(identity.email.as_deref().unwrap_or_default().as_bytes()).ok()?;

    Some((user_id, email))
}
