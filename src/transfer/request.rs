//! Request Normalizer
//!
//! Turns an opaque HTTP body into a list of [`TransferRequest`]s. The body may be a
//! single request object or an array of them; downstream code only ever sees the list.

use serde::Deserialize;

use super::error::TransferError;
use super::types::{Amount, TransferRequest, TransferType};

/// Wire shape of one transfer request. Every field is optional here so that
/// missing fields can be reported together instead of failing on the first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransferRequest {
    #[serde(alias = "type")]
    pub transfer_type: Option<String>,
    pub amount: Option<String>,
    pub originator: Option<String>,
    pub originator_depository: Option<String>,
    pub customer: Option<String>,
    pub customer_depository: Option<String>,
    pub description: Option<String>,
    pub standard_entry_class_code: Option<String>,
    #[serde(default)]
    pub same_day: bool,
}

/// Single object or array, tried in that order
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequestBody {
    Single(RawTransferRequest),
    Batch(Vec<RawTransferRequest>),
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(|v| v.trim().is_empty())
}

impl RawTransferRequest {
    /// Names of every required field that is absent or blank, in a fixed order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("transferType", &self.transfer_type),
            ("amount", &self.amount),
            ("originator", &self.originator),
            ("originatorDepository", &self.originator_depository),
            ("customer", &self.customer),
            ("customerDepository", &self.customer_depository),
            ("standardEntryClassCode", &self.standard_entry_class_code),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name)
        .collect()
    }

    /// Check required fields and parse typed values
    pub fn normalize(self) -> Result<TransferRequest, TransferError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(TransferError::MissingFields(missing));
        }

        let transfer_type: TransferType = self.transfer_type.unwrap_or_default().parse()?;
        let amount: Amount = self.amount.unwrap_or_default().parse()?;

        Ok(TransferRequest {
            transfer_type,
            amount,
            originator: self.originator.unwrap_or_default().into(),
            originator_depository: self.originator_depository.unwrap_or_default().into(),
            customer: self.customer.unwrap_or_default().into(),
            customer_depository: self.customer_depository.unwrap_or_default().into(),
            description: self.description.unwrap_or_default().trim().to_string(),
            standard_entry_class_code: self
                .standard_entry_class_code
                .unwrap_or_default()
                .trim()
                .to_string(),
            same_day: self.same_day,
        })
    }
}

/// Parse a body holding one request object or an array of request objects.
///
/// # Errors
/// - `EmptyRequest` when neither shape parses or the array is empty
/// - `MissingFields` naming every blank required field of the first incomplete request
/// - `InvalidEnumValue` / `InvalidAmount` for unparseable typed fields
pub fn read_transfer_requests(body: &[u8]) -> Result<Vec<TransferRequest>, TransferError> {
    let raw = match serde_json::from_slice::<RequestBody>(body) {
        Ok(RequestBody::Single(req)) => vec![req],
        Ok(RequestBody::Batch(reqs)) => reqs,
        Err(e) => {
            tracing::debug!(error = %e, "Transfer body matched neither object nor array shape");
            return Err(TransferError::EmptyRequest);
        }
    };

    if raw.is_empty() {
        return Err(TransferError::EmptyRequest);
    }

    raw.into_iter().map(RawTransferRequest::normalize).collect()
}
