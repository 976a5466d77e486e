//! Payment Record
//!
//! The structured file handed to the file-building service. Byte-level NACHA
//! encoding happens there; this is the JSON shape it accepts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub file_header: FileHeader,
    pub batches: Vec<Batch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHeader {
    pub immediate_origin: String,
    pub immediate_origin_name: String,
    pub immediate_destination: String,
    pub immediate_destination_name: String,
    /// YYMMDD
    pub file_creation_date: String,
    /// HHMM
    pub file_creation_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub batch_header: BatchHeader,
    pub entry_details: Vec<EntryDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchHeader {
    pub service_class_code: u16,
    pub company_name: String,
    pub company_identification: String,
    pub standard_entry_class_code: String,
    pub company_entry_description: String,
    /// YYMMDD
    pub effective_entry_date: String,
    pub odfi_identification: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetail {
    pub transaction_code: u8,
    pub rdfi_identification: String,
    pub check_digit: String,
    pub dfi_account_number: String,
    /// Minor units
    pub amount: i64,
    pub identification_number: String,
    pub individual_name: String,
    pub discretionary_data: String,
    pub trace_number: String,
    pub addenda05: Vec<Addenda05>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addenda05 {
    pub type_code: String,
    pub payment_related_information: String,
    pub sequence_number: u32,
    pub entry_detail_sequence_number: String,
}

impl PaymentRecord {
    /// Entry of the single batch this crate builds
    pub fn entry(&self) -> Option<&EntryDetail> {
        self.batches.first().and_then(|b| b.entry_details.first())
    }

    pub fn batch_header(&self) -> Option<&BatchHeader> {
        self.batches.first().map(|b| &b.batch_header)
    }
}
