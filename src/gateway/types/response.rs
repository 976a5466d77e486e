//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified success wrapper
//! - `ProblemPayload` / `ApiError`: Structured error body
//! - `error_codes`: Gateway-level error codes

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::transfer::error::{ErrorKind, TransferError};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success
/// - msg: short message description
/// - data: actual data
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Problem payload
// ============================================================================

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPayload {
    /// Stable machine-readable code
    #[schema(example = "MISSING_FIELDS")]
    pub code: String,
    /// Error class
    #[schema(example = "validation")]
    pub error: String,
    /// Human-readable detail
    #[schema(example = "missing required fields: amount, customer")]
    pub message: String,
    #[schema(example = "5f0c1e9a-3a7e-4b8e-9a53-0b3c1f0d6a11")]
    pub request_id: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub payload: ProblemPayload,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &str,
        error: &str,
        message: impl Into<String>,
        request_id: &str,
    ) -> Self {
        Self {
            status,
            payload: ProblemPayload {
                code: code.to_string(),
                error: error.to_string(),
                message: message.into(),
                request_id: request_id.to_string(),
            },
        }
    }

    pub fn from_transfer(err: &TransferError, request_id: &str) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // Internal details stay in the logs
        let message = match err.kind() {
            ErrorKind::Internal => "internal error".to_string(),
            _ => err.to_string(),
        };
        Self::new(status, err.code(), kind_label(err.kind()), message, request_id)
    }

    pub fn seen_before(request_id: &str) -> Self {
        Self::new(
            StatusCode::PRECONDITION_FAILED,
            error_codes::SEEN_BEFORE,
            "precondition",
            "idempotency key seen before",
            request_id,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.payload)).into_response()
    }
}

pub fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Precondition => "precondition",
        ErrorKind::ExternalService => "external_service",
        ErrorKind::Internal => "internal",
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedData {
    #[schema(example = "01hzy8k3v6xq9p2m4n5r7t8w0a")]
    pub id: String,
}

// ============================================================================
// Error Codes
// ============================================================================

/// Gateway-level error codes. Domain errors use `TransferError::code()`.
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    pub const MISSING_USER_ID: &str = "MISSING_USER_ID";
    pub const SEEN_BEFORE: &str = "SEEN_BEFORE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_from_transfer_error() {
        let err = TransferError::MissingFields(vec!["amount"]);
        let api = ApiError::from_transfer(&err, "req-1");
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&api.payload).unwrap();
        assert_eq!(json["code"], "MISSING_FIELDS");
        assert_eq!(json["error"], "validation");
        assert_eq!(json["message"], "missing required fields: amount");
        assert_eq!(json["requestId"], "req-1");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = TransferError::DatabaseError("password authentication failed".into());
        let api = ApiError::from_transfer(&err, "req-1");
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.payload.message, "internal error");
    }

    #[test]
    fn test_seen_before() {
        let api = ApiError::seen_before("req-9");
        assert_eq!(api.status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(api.payload.code, "SEEN_BEFORE");
    }
}
