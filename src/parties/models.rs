//! Read models for the parties a transfer moves money between
//!
//! Customers, originators and depositories are owned by their own services; this
//! crate only reads them, checks `status`, and calls `validate()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ach::codes::AccountType;
use crate::core_types::{CustomerId, DepositoryId, OriginatorId, UserId};
use crate::transfer::error::TransferError;

// ============================================================================
// Statuses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Unverified,
    Verified,
    Suspended,
    Deceased,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Unverified => "unverified",
            CustomerStatus::Verified => "verified",
            CustomerStatus::Suspended => "suspended",
            CustomerStatus::Deceased => "deceased",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerStatus {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            CustomerStatus::Unverified,
            CustomerStatus::Verified,
            CustomerStatus::Suspended,
            CustomerStatus::Deceased,
        ]
        .into_iter()
        .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| TransferError::InvalidEnumValue {
            kind: "CustomerStatus",
            value: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositoryStatus {
    Unverified,
    Verified,
    Rejected,
}

impl DepositoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositoryStatus::Unverified => "unverified",
            DepositoryStatus::Verified => "verified",
            DepositoryStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DepositoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositoryStatus {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            DepositoryStatus::Unverified,
            DepositoryStatus::Verified,
            DepositoryStatus::Rejected,
        ]
        .into_iter()
        .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| TransferError::InvalidEnumValue {
            kind: "DepositoryStatus",
            value: s.to_string(),
        })
    }
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    /// Free-form display name, used as the entry's individual name
    pub metadata: String,
    pub email: String,
    pub status: CustomerStatus,
}

impl Customer {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id is required".into());
        }
        if !self.email.contains('@') {
            return Err(format!("invalid email {:?}", self.email));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Originator {
    pub id: OriginatorId,
    pub user_id: UserId,
    pub default_depository: DepositoryId,
    /// Company identification sent in the batch header
    pub identification: String,
    /// Company display name
    pub metadata: String,
}

impl Originator {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id is required".into());
        }
        if self.identification.trim().is_empty() {
            return Err("identification is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Depository {
    pub id: DepositoryId,
    pub user_id: UserId,
    pub bank_name: String,
    pub holder: String,
    /// `None` for rows created before account types were recorded
    pub account_type: Option<AccountType>,
    pub routing_number: String,
    pub account_number: String,
    pub status: DepositoryStatus,
}

impl Depository {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id is required".into());
        }
        if self.account_number.trim().is_empty() {
            return Err("account number is required".into());
        }
        check_routing_number(&self.routing_number)
    }
}

/// ABA routing number check: nine digits, 3-7-1 weighted checksum
pub fn check_routing_number(rtn: &str) -> Result<(), String> {
    if rtn.len() != 9 || !rtn.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("routing number {:?} must be 9 digits", rtn));
    }

    const WEIGHTS: [u32; 9] = [3, 7, 1, 3, 7, 1, 3, 7, 1];
    let sum: u32 = rtn
        .bytes()
        .zip(WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();

    if sum % 10 != 0 {
        return Err(format!("routing number {:?} has an invalid check digit", rtn));
    }
    Ok(())
}
