//! Per-request context extracted from headers
//!
//! - `X-User-ID`: required, opaque caller identity
//! - `X-Request-ID`: optional, generated when absent
//! - `X-Idempotency-Key`: optional, drives the replay check on mutating endpoints

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::HeaderMap, request::Parts},
};
use tracing::{error, warn};

use super::types::{ApiError, error_codes};
use crate::transfer::TransferError;
use crate::transfer::types::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const IDEMPOTENCY_KEY_HEADER: &str = "x-idempotency-key";

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: UserId,
    pub request_id: String,
    pub idempotency_key: Option<String>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let request_id = header_value(headers, REQUEST_ID_HEADER)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let Some(user_id) = header_value(headers, USER_ID_HEADER) else {
            warn!(request_id = %request_id, "request without user id");
            return Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                error_codes::MISSING_USER_ID,
                "unauthorized",
                "missing X-User-ID header",
                &request_id,
            ));
        };

        Ok(Self {
            user_id: UserId::new(user_id),
            request_id,
            idempotency_key: header_value(headers, IDEMPOTENCY_KEY_HEADER),
        })
    }

    /// Log and render a domain error for this request
    pub fn error(&self, err: TransferError) -> ApiError {
        let api = ApiError::from_transfer(&err, &self.request_id);
        if api.status.is_server_error() {
            error!(
                user_id = %self.user_id,
                request_id = %self.request_id,
                code = err.code(),
                "{}",
                err
            );
        } else {
            warn!(
                user_id = %self.user_id,
                request_id = %self.request_id,
                code = err.code(),
                "{}",
                err
            );
        }
        api
    }

    pub fn seen_before(&self) -> ApiError {
        warn!(
            user_id = %self.user_id,
            request_id = %self.request_id,
            "idempotency key replayed"
        );
        ApiError::seen_before(&self.request_id)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
