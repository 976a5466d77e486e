//! Core identifier types used throughout the system
//!
//! Every identifier is an opaque string normalized to lower case on construction,
//! so equality and hashing are case-insensitive without ad hoc helpers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl AsRef<str>) -> Self {
                Self(raw.as_ref().trim().to_lowercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Caller identity extracted from the request context. Scopes every read and write.
    UserId
);

string_id!(
    /// Server-generated transfer identifier
    TransferId
);

string_id!(CustomerId);
string_id!(OriginatorId);
string_id!(DepositoryId);

string_id!(
    /// Audit event identifier
    EventId
);

impl TransferId {
    /// Generate a new unique, time-sortable TransferId
    pub fn generate() -> Self {
        Self::new(ulid::Ulid::new().to_string())
    }
}

impl EventId {
    pub fn generate() -> Self {
        Self::new(ulid::Ulid::new().to_string())
    }
}
