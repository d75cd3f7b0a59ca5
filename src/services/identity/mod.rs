/*
 * Responsibility
 * - ID トークン検証の公開インターフェース (IdentityVerifier trait)
 * - 検証結果の型 (DecodedIdentity) と失敗分類 (VerifyError)
 * - 実装 (Firebase) と鍵の取得元 (KeySource) はサブモジュールに分離
 */
use async_trait::async_trait;
use thiserror::Error;

pub mod firebase;
pub mod keys;
pub mod service_account;

#[cfg(test)]
pub mod fake;

pub use firebase::FirebaseVerifier;
pub use keys::{GoogleKeySource, KeySource, KeySourceError};
pub use service_account::ServiceAccount;

/// 検証済みトークンから取り出した主体情報
///
/// リクエスト単位で生成され、永続化しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIdentity {
    pub subject_id: String,
    pub email: Option<String>,
}

/// Why a presented token was not accepted.
///
/// Kept for server-side logs only; it never reaches the HTTP response.
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("unsupported token alg: {0:?}")]
    UnsupportedAlg(jsonwebtoken::Algorithm),
    #[error("missing kid in token header")]
    MissingKid,
    #[error("unknown signing key: {0}")]
    UnknownKid(String),
    #[error("missing required claim: {0}")]
    MissingClaim(&'static str),
    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The token was presented but is not acceptable (expired, bad signature, wrong audience...).
    #[error("credential rejected: {0}")]
    Rejected(#[from] RejectReason),
    /// The verifier could not reach a decision (key fetch failed, malformed key set...).
    #[error("verifier unavailable: {0}")]
    Unavailable(#[from] KeySourceError),
}

/// Exchanges a bearer token for the identity it asserts.
///
/// Implementations must be safe to share across requests; each call is independent.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<DecodedIdentity, VerifyError>;
}
