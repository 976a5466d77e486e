//! Transfer Status Definitions
//!
//! Status names are stored as lower-case text in PostgreSQL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::error::TransferError;

/// Transfer lifecycle status
///
/// ```text
/// PENDING → PROCESSED → RECLAIMED
///    ↓
/// FAILED | RECLAIMED | CANCELED
/// ```
///
/// Only `pending` is set by this crate; the other transitions are driven by
/// downstream processing and must go through [`TransferStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Created and submitted, awaiting downstream processing
    Pending,
    /// Sent to the network
    Processed,
    /// Terminal: rejected downstream
    Failed,
    /// Terminal: returned after processing
    Reclaimed,
    /// Terminal: withdrawn before processing
    Canceled,
}

impl TransferStatus {
    pub const ALL: [TransferStatus; 5] = [
        TransferStatus::Pending,
        TransferStatus::Processed,
        TransferStatus::Failed,
        TransferStatus::Reclaimed,
        TransferStatus::Canceled,
    ];

    /// Check if this is a terminal status (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Failed | TransferStatus::Reclaimed | TransferStatus::Canceled
        )
    }

    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        match (self, next) {
            (TransferStatus::Pending, TransferStatus::Pending) => false,
            (TransferStatus::Pending, _) => true,
            (TransferStatus::Processed, TransferStatus::Reclaimed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Processed => "processed",
            TransferStatus::Failed => "failed",
            TransferStatus::Reclaimed => "reclaimed",
            TransferStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransferStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TransferError::InvalidEnumValue {
                kind: "TransferStatus",
                value: s.to_string(),
            })
    }
}

impl PartialEq<str> for TransferStatus {
    fn eq(&self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other.trim())
    }
}
