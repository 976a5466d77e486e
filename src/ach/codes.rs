//! ACH code tables
//!
//! Transaction codes are selected from a closed table keyed by
//! (account type, direction, entry mode). Service class codes follow the
//! direction of the batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transfer::error::TransferError;
use crate::transfer::types::TransferType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("checking") {
            Ok(AccountType::Checking)
        } else if s.eq_ignore_ascii_case("savings") {
            Ok(AccountType::Savings)
        } else {
            Err(TransferError::InvalidEnumValue {
                kind: "AccountType",
                value: s.to_string(),
            })
        }
    }
}

/// Money movement seen from the receiving account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Credit,
    Debit,
}

impl From<TransferType> for Direction {
    /// Push credits the customer, pull debits them
    fn from(t: TransferType) -> Self {
        match t {
            TransferType::Push => Direction::Credit,
            TransferType::Pull => Direction::Debit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryMode {
    Live,
    /// Zero-dollar account verification entry
    Prenote,
}

/// Transaction code lookup
///
/// | account  | direction | live | prenote |
/// |----------|-----------|------|---------|
/// | checking | credit    | 22   | 23      |
/// | checking | debit     | 27   | 28      |
/// | savings  | credit    | 32   | 33      |
/// | savings  | debit     | 37   | 38      |
pub fn transaction_code(account: AccountType, direction: Direction, mode: EntryMode) -> u8 {
    use AccountType::*;
    use Direction::*;
    use EntryMode::*;

    match (account, direction, mode) {
        (Checking, Credit, Live) => 22,
        (Checking, Credit, Prenote) => 23,
        (Checking, Debit, Live) => 27,
        (Checking, Debit, Prenote) => 28,
        (Savings, Credit, Live) => 32,
        (Savings, Credit, Prenote) => 33,
        (Savings, Debit, Live) => 37,
        (Savings, Debit, Prenote) => 38,
    }
}

pub mod service_class {
    pub const MIXED: u16 = 200;
    pub const CREDITS_ONLY: u16 = 220;
    pub const DEBITS_ONLY: u16 = 225;
}

pub fn service_class_code(direction: Direction) -> u16 {
    match direction {
        Direction::Credit => service_class::CREDITS_ONLY,
        Direction::Debit => service_class::DEBITS_ONLY,
    }
}

/// Split a routing number into its 8-digit institution identifier and check digit.
///
/// Any length other than 8 or 9 yields two empty strings; an 8-character
/// input has no check digit.
pub fn split_routing_number(rtn: &str) -> (String, String) {
    match rtn.len() {
        8 if rtn.is_ascii() => (rtn.to_string(), String::new()),
        9 if rtn.is_ascii() => (rtn[..8].to_string(), rtn[8..9].to_string()),
        _ => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_code_table_is_complete_and_distinct() {
        let mut seen = std::collections::HashSet::new();
        for account in [AccountType::Checking, AccountType::Savings] {
            for direction in [Direction::Credit, Direction::Debit] {
                for mode in [EntryMode::Live, EntryMode::Prenote] {
                    assert!(seen.insert(transaction_code(account, direction, mode)));
                }
            }
        }
        let mut codes: Vec<u8> = seen.into_iter().collect();
        codes.sort_unstable();
        assert_eq!(codes, vec![22, 23, 27, 28, 32, 33, 37, 38]);
    }

    #[test]
    fn test_transfer_type_direction() {
        assert_eq!(Direction::from(TransferType::Push), Direction::Credit);
        assert_eq!(Direction::from(TransferType::Pull), Direction::Debit);
        assert_eq!(service_class_code(Direction::Credit), 220);
        assert_eq!(service_class_code(Direction::Debit), 225);
    }

    #[test]
    fn test_split_routing_number() {
        assert_eq!(
            split_routing_number("123456780"),
            ("12345678".to_string(), "0".to_string())
        );
        assert_eq!(
            split_routing_number("12345678"),
            ("12345678".to_string(), String::new())
        );
        for bad in ["", "1234567", "1234567890", "12345"] {
            assert_eq!(split_routing_number(bad), (String::new(), String::new()));
        }
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!("SAVINGS".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert!("brokerage".parse::<AccountType>().is_err());
    }
}
