/*
 * Responsibility
 * - GET /batch?type=small|big
 * - 種別の確認と要求者の記録のみ (集計処理そのものは持たない)
 */
use axum::{
    Json,
    extract::{Query, rejection::QueryRejection},
};

use crate::{
    api::v1::{
        dto::batch::{BatchQuery, BatchResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
};

pub async fn batch(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<BatchQuery>, QueryRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    let Query(BatchQuery { batch_type }) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "batch query rejected");
        AppError::bad_request("INVALID_BATCH_TYPE", "type must be small or big")
    })?;

    tracing::info!(user_id = %ctx.user_id, ?batch_type, "batch requested");

    Ok(Json(BatchResponse {
        batch_type,
        requested_by: ctx.user_id,
    }))
}
