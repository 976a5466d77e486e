//! Service Adapters
//!
//! Adapters for the external services a transfer touches: the file-building
//! service (create, build, validate, delete) and the ledger.
//! File creation must be idempotent on the caller-supplied key.

pub mod file_service;
pub mod ledger;

pub use file_service::HttpFileService;
pub use ledger::{HttpLedgerClient, NoopLedger};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::error::TransferError;
use super::types::{Transfer, UserId};
use crate::ach::PaymentRecord;

/// File-building / validation service
#[async_trait]
pub trait FileService: Send + Sync {
    /// Create a file from the record
    ///
    /// # Idempotency
    /// Repeating a call with the same key returns the original file handle.
    async fn create_file(
        &self,
        idempotency_key: &str,
        record: &PaymentRecord,
    ) -> Result<String, TransferError>;

    /// Render the file. Called for its build side effect.
    async fn get_file_contents(&self, file_id: &str) -> Result<Vec<u8>, TransferError>;

    async fn validate_file(&self, file_id: &str) -> Result<(), TransferError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), TransferError>;
}

/// Ledger posting for created transfers. Failures are logged by callers, never surfaced.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn post_transfer(&self, user_id: &UserId, transfer: &Transfer)
    -> Result<(), TransferError>;
}

/// Classify a transport error: timeouts and connection failures are retryable
pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> TransferError {
    let retryable = err.is_timeout() || err.is_connect();
    TransferError::external(service, err.to_string(), retryable)
}

/// Classify a non-success HTTP status: 5xx is retryable, 4xx is not
pub(crate) fn status_error(service: &'static str, status: StatusCode, body: &str) -> TransferError {
    let message = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    };
    TransferError::external(service, message, status.is_server_error())
}
