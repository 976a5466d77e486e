//! Submission Coordinator
//!
//! Submits an assembled record to the file service and returns the file handle.
//!
//! ```text
//! create_file(key) -> get_file_contents (build, result ignored) -> validate_file
//!                                                                      ↓ error
//!                                                               delete_file (best effort)
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::adapters::FileService;
use super::error::TransferError;
use crate::ach::PaymentRecord;

pub struct SubmissionCoordinator {
    files: Arc<dyn FileService>,
}

impl SubmissionCoordinator {
    pub fn new(files: Arc<dyn FileService>) -> Self {
        Self { files }
    }

    /// Submit a record. A validation failure rejects the submission and no
    /// handle is returned.
    pub async fn submit(
        &self,
        idempotency_key: &str,
        record: &PaymentRecord,
    ) -> Result<String, TransferError> {
        let file_id = self.files.create_file(idempotency_key, record).await?;
        debug!(file_id = %file_id, key = %idempotency_key, "File created");

        // Build step: only the side effect matters
        if let Err(e) = self.files.get_file_contents(&file_id).await {
            warn!(file_id = %file_id, error = %e, "Building file contents failed");
        }

        if let Err(e) = self.files.validate_file(&file_id).await {
            warn!(file_id = %file_id, error = %e, "File failed validation, deleting");
            self.discard(&file_id).await;
            return Err(e);
        }

        info!(file_id = %file_id, "File submitted");
        Ok(file_id)
    }

    /// Best-effort remote delete; failures are logged only
    pub async fn discard(&self, file_id: &str) {
        if let Err(e) = self.files.delete_file(file_id).await {
            warn!(file_id = %file_id, error = %e, "Failed to delete remote file");
        }
    }
}
