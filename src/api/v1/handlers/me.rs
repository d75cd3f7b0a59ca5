/*
 * Responsibility
 * - GET /api/v1/me
 * - gate が付与した identity をそのまま返す (フロントの確認用)
 */
use axum::Json;

use crate::api::v1::extractors::{AuthCtx, AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<AuthCtx> {
    Json(ctx)
}
