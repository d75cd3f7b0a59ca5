/*
 * Responsibility
 * - GET / と GET /health (疎通用、gate の外)
 * - GET /api/v1/health (gate の内側、トークン疎通確認用)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"service": env!("CARGO_PKG_NAME"), "status": "ok"})),
    )
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
