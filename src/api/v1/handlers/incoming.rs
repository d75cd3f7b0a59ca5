/*
 * Responsibility
 * - POST /incoming, POST /incoming/containers
 * - Json を受け、DTO validation → 受付ログ → 202
 * - 永続化は持たない (受付 id を払い出して返すのみ)
 */
use axum::{Json, http::StatusCode};

use crate::{
    api::v1::{
        dto::incoming::{CreateIncomingRequest, IncomingContainerRequest, IntakeReceipt},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
};

const INVALID_INTAKE: &str = "INVALID_INTAKE";

pub async fn create_incoming(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateIncomingRequest>,
) -> Result<(StatusCode, Json<IntakeReceipt>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request(INVALID_INTAKE, msg))?;

    let receipt = IntakeReceipt::received(ctx.user_id, None);

    tracing::info!(
        id = %receipt.id,
        user_id = %receipt.created_by,
        purchase_type = ?req.purchase_type,
        supplier = %req.supplier_name,
        items = req.items.len(),
        "incoming goods received"
    );

    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

pub async fn create_containers(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(containers): Json<Vec<IncomingContainerRequest>>,
) -> Result<(StatusCode, Json<IntakeReceipt>), AppError> {
    if containers.is_empty() {
        return Err(AppError::bad_request(
            INVALID_INTAKE,
            "at least one container is required",
        ));
    }
    for container in &containers {
        container
            .validate()
            .map_err(|msg| AppError::bad_request(INVALID_INTAKE, msg))?;
    }

    let receipt = IntakeReceipt::received(ctx.user_id, Some(containers.len()));

    tracing::info!(
        id = %receipt.id,
        user_id = %receipt.created_by,
        count = containers.len(),
        "incoming containers received"
    );

    Ok((StatusCode::ACCEPTED, Json(receipt)))
}
