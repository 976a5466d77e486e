//! Transfer handlers
//!
//! Every handler is scoped by the caller's `X-User-ID`. Mutating endpoints run the
//! idempotency replay check before touching anything else.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use tracing::info;

use super::super::context::RequestContext;
use super::super::state::AppState;
use super::super::types::{ApiError, ApiResponse, DeletedData, ProblemPayload};
use crate::transfer::types::TransferId;
use crate::transfer::{CreateOutcome, Event, Transfer};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// List the caller's transfers
#[utoipa::path(
    get,
    path = "/transfers",
    params(
        ("X-User-ID" = String, Header, description = "Caller identity"),
    ),
    responses(
        (status = 200, description = "Transfers owned by the caller", body = ApiResponse<Vec<Transfer>>),
        (status = 401, description = "Missing user id", body = ProblemPayload),
        (status = 500, description = "Internal error", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> ApiResult<Vec<Transfer>> {
    let transfers = state
        .service
        .get_transfers(&ctx.user_id)
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(Json(ApiResponse::success(transfers)))
}

/// Get one transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-User-ID" = String, Header, description = "Caller identity"),
    ),
    responses(
        (status = 200, description = "Transfer", body = ApiResponse<Transfer>),
        (status = 404, description = "Unknown transfer or not owned by caller", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Transfer> {
    let transfer = state
        .service
        .get_transfer(&TransferId::new(id), &ctx.user_id)
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(Json(ApiResponse::success(transfer)))
}

/// Create one or more transfers
///
/// Accepts a single transfer object or an array. All or nothing: the first
/// failing request aborts the batch.
#[utoipa::path(
    post,
    path = "/transfers",
    params(
        ("X-User-ID" = String, Header, description = "Caller identity"),
        ("X-Idempotency-Key" = Option<String>, Header, description = "Replay protection key"),
    ),
    request_body(content = String, description = "Transfer request object or array of them", content_type = "application/json"),
    responses(
        (status = 200, description = "Transfers created", body = ApiResponse<Vec<Transfer>>),
        (status = 400, description = "Invalid request", body = ProblemPayload),
        (status = 404, description = "Unknown party", body = ProblemPayload),
        (status = 412, description = "Idempotency key seen before", body = ProblemPayload),
        (status = 422, description = "Party not verified", body = ProblemPayload),
        (status = 502, description = "File service failure", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn create_transfers(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    body: Bytes,
) -> ApiResult<Vec<Transfer>> {
    match state
        .service
        .create_transfers(&ctx.user_id, ctx.idempotency_key.as_deref(), &body)
        .await
        .map_err(|e| ctx.error(e))?
    {
        CreateOutcome::SeenBefore => Err(ctx.seen_before()),
        CreateOutcome::Created(transfers) => {
            info!(
                user_id = %ctx.user_id,
                request_id = %ctx.request_id,
                count = transfers.len(),
                "Created transfers"
            );
            Ok(Json(ApiResponse::success(transfers)))
        }
    }
}

/// Create transfers (batch alias of `POST /transfers`)
#[utoipa::path(
    post,
    path = "/transfers/batch",
    params(
        ("X-User-ID" = String, Header, description = "Caller identity"),
        ("X-Idempotency-Key" = Option<String>, Header, description = "Replay protection key"),
    ),
    request_body(content = String, description = "Array of transfer requests", content_type = "application/json"),
    responses(
        (status = 200, description = "Transfers created", body = ApiResponse<Vec<Transfer>>),
        (status = 400, description = "Invalid request", body = ProblemPayload),
        (status = 412, description = "Idempotency key seen before", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn create_transfers_batch(
    state: State<Arc<AppState>>,
    ctx: RequestContext,
    body: Bytes,
) -> ApiResult<Vec<Transfer>> {
    create_transfers(state, ctx, body).await
}

/// Delete a pending transfer
#[utoipa::path(
    delete,
    path = "/transfers/{id}",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-User-ID" = String, Header, description = "Caller identity"),
        ("X-Idempotency-Key" = Option<String>, Header, description = "Replay protection key"),
    ),
    responses(
        (status = 200, description = "Transfer deleted", body = ApiResponse<DeletedData>),
        (status = 404, description = "Unknown transfer", body = ProblemPayload),
        (status = 412, description = "Idempotency key seen before", body = ProblemPayload),
        (status = 422, description = "Transfer is not pending", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn delete_transfer(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<DeletedData> {
    if state
        .service
        .seen_before(&ctx.user_id, ctx.idempotency_key.as_deref())
    {
        return Err(ctx.seen_before());
    }

    let id = TransferId::new(id);
    state
        .service
        .delete_transfer(&id, &ctx.user_id)
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(Json(ApiResponse::success(DeletedData { id: id.to_string() })))
}

/// Audit events of a transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}/events",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-User-ID" = String, Header, description = "Caller identity"),
    ),
    responses(
        (status = 200, description = "Events, oldest first", body = ApiResponse<Vec<Event>>),
        (status = 404, description = "Unknown transfer", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn get_transfer_events(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Vec<Event>> {
    let events = state
        .service
        .get_transfer_events(&TransferId::new(id), &ctx.user_id)
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(Json(ApiResponse::success(events)))
}

/// Mark a transfer as failed (acknowledged, no effect)
#[utoipa::path(
    post,
    path = "/transfers/{id}/failed",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-User-ID" = String, Header, description = "Caller identity"),
        ("X-Idempotency-Key" = Option<String>, Header, description = "Replay protection key"),
    ),
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 412, description = "Idempotency key seen before", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn transfer_failed(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    if state
        .service
        .seen_before(&ctx.user_id, ctx.idempotency_key.as_deref())
    {
        return Err(ctx.seen_before());
    }
    info!(user_id = %ctx.user_id, request_id = %ctx.request_id, transfer_id = %id, "Transfer failure acknowledged");
    Ok(())
}

/// Files of a transfer (placeholder)
#[utoipa::path(
    post,
    path = "/transfers/{id}/files",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-User-ID" = String, Header, description = "Caller identity"),
        ("X-Idempotency-Key" = Option<String>, Header, description = "Replay protection key"),
    ),
    responses(
        (status = 200, description = "Placeholder text", body = String, content_type = "text/plain"),
        (status = 412, description = "Idempotency key seen before", body = ProblemPayload)
    ),
    tag = "Transfers"
)]
pub async fn transfer_files(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    if state
        .service
        .seen_before(&ctx.user_id, ctx.idempotency_key.as_deref())
    {
        return Err(ctx.seen_before());
    }
    Ok(format!("files for transfer {id} are not available yet"))
}
