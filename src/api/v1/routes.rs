/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /me, /incoming, /incoming/containers
 * - 認証は gate (Router 全体) 側で掛かる。ここでは route だけ
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    incoming::{create_containers, create_incoming},
    me::me,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/incoming", post(create_incoming))
        .route("/incoming/containers", post(create_containers))
}
