//! Transfer Error Types
//!
//! One enum for the whole transfer pipeline. Every variant belongs to exactly one
//! [`ErrorKind`], which decides the HTTP status family and how the gateway logs it.

use thiserror::Error;

use crate::money::MoneyError;

/// Error classification used for API responses and operational logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input (4xx)
    Validation,
    /// Entity absent or not owned by the caller (4xx)
    NotFound,
    /// Entity exists but is in the wrong state (4xx)
    Precondition,
    /// File-building or ledger service failure
    ExternalService,
    /// Persistence or serialization failure (5xx)
    Internal,
}

#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("no transfer requests found in body")]
    EmptyRequest,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid {kind} value: {value:?}")]
    InvalidEnumValue { kind: &'static str, value: String },

    #[error("invalid routing number {0:?}: expected 8 or 9 characters")]
    InvalidRoutingNumber(String),

    #[error("{party}: {reason}")]
    InvalidParty { party: &'static str, reason: String },

    #[error(
        "invalid transfer (originator={originator}, customer={customer}, description={description:?}): {reason}"
    )]
    InvalidTransfer {
        originator: String,
        customer: String,
        description: String,
        reason: String,
    },

    // === Not Found ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // === Precondition Errors ===
    #[error("depository {id} is not verified (status: {status})")]
    DepositoryNotVerified { id: String, status: String },

    #[error("customer {id} must be verified for pull transfers (status: {status})")]
    CustomerNotVerifiedForPull { id: String, status: String },

    #[error("transfer {id} is not pending (status: {status})")]
    TransferNotPending { id: String, status: String },

    #[error("transfer {id} cannot move from {from} to {to}")]
    InvalidStateTransition { id: String, from: String, to: String },

    // === External Services ===
    #[error("{service} error: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
        retryable: bool,
    },

    // === System Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal system error: {0}")]
    SystemError(String),
}

impl TransferError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        TransferError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn external(service: &'static str, message: impl Into<String>, retryable: bool) -> Self {
        TransferError::ExternalService {
            service,
            message: message.into(),
            retryable,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::EmptyRequest
            | TransferError::MissingFields(_)
            | TransferError::InvalidAmount(_)
            | TransferError::InvalidEnumValue { .. }
            | TransferError::InvalidRoutingNumber(_)
            | TransferError::InvalidParty { .. }
            | TransferError::InvalidTransfer { .. } => ErrorKind::Validation,
            TransferError::NotFound { .. } => ErrorKind::NotFound,
            TransferError::DepositoryNotVerified { .. }
            | TransferError::CustomerNotVerifiedForPull { .. }
            | TransferError::TransferNotPending { .. }
            | TransferError::InvalidStateTransition { .. } => ErrorKind::Precondition,
            TransferError::ExternalService { .. } => ErrorKind::ExternalService,
            TransferError::DatabaseError(_) | TransferError::SystemError(_) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferError::ExternalService { retryable, .. } => *retryable,
            TransferError::DatabaseError(_) => true,
            _ => false,
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::EmptyRequest => "EMPTY_REQUEST",
            TransferError::MissingFields(_) => "MISSING_FIELDS",
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::InvalidEnumValue { .. } => "INVALID_ENUM_VALUE",
            TransferError::InvalidRoutingNumber(_) => "INVALID_ROUTING_NUMBER",
            TransferError::InvalidParty { .. } => "INVALID_PARTY",
            TransferError::InvalidTransfer { .. } => "INVALID_TRANSFER",
            TransferError::NotFound { .. } => "NOT_FOUND",
            TransferError::DepositoryNotVerified { .. } => "DEPOSITORY_NOT_VERIFIED",
            TransferError::CustomerNotVerifiedForPull { .. } => "CUSTOMER_NOT_VERIFIED_FOR_PULL",
            TransferError::TransferNotPending { .. } => "TRANSFER_NOT_PENDING",
            TransferError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            TransferError::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            TransferError::DatabaseError(_) => "DATABASE_ERROR",
            TransferError::SystemError(_) => "SYSTEM_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Precondition => 422,
            ErrorKind::ExternalService if self.is_retryable() => 503,
            ErrorKind::ExternalService => 502,
            ErrorKind::Internal => 500,
        }
    }
}

impl From<MoneyError> for TransferError {
    fn from(e: MoneyError) -> Self {
        TransferError::InvalidAmount(e.to_string())
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(e: sqlx::Error) -> Self {
        TransferError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(e: serde_json::Error) -> Self {
        TransferError::SystemError(e.to_string())
    }
}
