/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate が検証してヘッダに載せ、extractor がここに詰め替える
 *
 * Notes
 * - トークン検証は middleware/services 側の責務。ここは型（契約）のみ
 */
use serde::Serialize;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は Firebase の uid (`sub`)
/// - `email` は検証済みトークンに email が無い場合 None
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthCtx {
    pub user_id: String,
    pub email: Option<String>,
}
