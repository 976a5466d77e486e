//! Transfer Core Types
//!
//! Type definitions for the transfer pipeline.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub use crate::core_types::{CustomerId, DepositoryId, OriginatorId, TransferId, UserId};
pub use crate::money::Amount;

use super::error::TransferError;
use super::state::TransferStatus;

/// Direction of the money movement, seen from the originator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    /// Originator sends funds to the customer (credit)
    Push,
    /// Originator collects funds from the customer (debit)
    Pull,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Push => "push",
            TransferType::Pull => "pull",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("push") {
            Ok(TransferType::Push)
        } else if s.eq_ignore_ascii_case("pull") {
            Ok(TransferType::Pull)
        } else {
            Err(TransferError::InvalidEnumValue {
                kind: "TransferType",
                value: s.to_string(),
            })
        }
    }
}

impl PartialEq<str> for TransferType {
    fn eq(&self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other.trim())
    }
}

/// Normalized, field-complete transfer request
///
/// Produced by the request normalizer; never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub transfer_type: TransferType,
    pub amount: Amount,
    pub originator: OriginatorId,
    pub originator_depository: DepositoryId,
    pub customer: CustomerId,
    pub customer_depository: DepositoryId,
    pub description: String,
    pub standard_entry_class_code: String,
    pub same_day: bool,
}

impl TransferRequest {
    /// Convert into a `pending` Transfer with a server-assigned id
    pub fn to_transfer(&self, id: TransferId) -> Transfer {
        Transfer {
            id,
            transfer_type: self.transfer_type,
            amount: self.amount.clone(),
            originator: self.originator.clone(),
            originator_depository: self.originator_depository.clone(),
            customer: self.customer.clone(),
            customer_depository: self.customer_depository.clone(),
            description: self.description.clone(),
            standard_entry_class_code: self.standard_entry_class_code.clone(),
            status: TransferStatus::Pending,
            same_day: self.same_day,
            created: Utc::now().trunc_subsecs(6),
            file_id: None,
        }
    }
}

/// Persisted transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    #[schema(value_type = String, example = "01hzy8k3v6xq9p2m4n5r7t8w0a")]
    pub id: TransferId,
    pub transfer_type: TransferType,
    #[schema(value_type = String, example = "USD 125.00")]
    pub amount: Amount,
    #[schema(value_type = String)]
    pub originator: OriginatorId,
    #[schema(value_type = String)]
    pub originator_depository: DepositoryId,
    #[schema(value_type = String)]
    pub customer: CustomerId,
    #[schema(value_type = String)]
    pub customer_depository: DepositoryId,
    pub description: String,
    pub standard_entry_class_code: String,
    pub status: TransferStatus,
    pub same_day: bool,
    /// UTC, microsecond resolution (matches PostgreSQL TIMESTAMPTZ)
    pub created: DateTime<Utc>,
    /// Handle assigned by the file-building service once submission succeeds
    #[serde(skip)]
    pub file_id: Option<String>,
}

impl Transfer {
    /// Row-level checks run before a transfer is written
    pub fn validate(&self) -> Result<(), TransferError> {
        let reason = if let Err(e) = self.amount.validate() {
            Some(format!("amount: {}", e))
        } else if self.description.trim().is_empty() {
            Some("description is required".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(TransferError::InvalidTransfer {
                originator: self.originator.to_string(),
                customer: self.customer.to_string(),
                description: self.description.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}
