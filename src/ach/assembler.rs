//! Payment Record Assembler
//!
//! Pure transformation from a pending [`Transfer`] and its resolved parties to a
//! [`PaymentRecord`] with one batch, one entry and one addenda. No I/O.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::calendar;
use super::codes::{
    AccountType, Direction, EntryMode, service_class_code, split_routing_number, transaction_code,
};
use super::record::{Addenda05, Batch, BatchHeader, EntryDetail, FileHeader, PaymentRecord};
use crate::parties::models::CustomerStatus;
use crate::parties::resolver::ResolvedParties;
use crate::transfer::error::TransferError;
use crate::transfer::state::TransferStatus;
use crate::transfer::types::{Transfer, TransferType};

const TRACE_SEQUENCE_MODULUS: u32 = 10_000_000;
const IDENTIFICATION_NUMBER_LEN: usize = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Company name used when the originator has no metadata
    pub company_name_placeholder: String,
    pub payment_related_information: String,
    /// Account type assumed for depositories that do not record one
    pub fallback_account_type: AccountType,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            company_name_placeholder: "Payment Gateway".to_string(),
            payment_related_information: "Transfer initiated through payment gateway".to_string(),
            fallback_account_type: AccountType::Checking,
        }
    }
}

pub struct PaymentAssembler {
    config: AssemblerConfig,
}

impl PaymentAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    /// Assemble against the service's local clock
    pub fn assemble(
        &self,
        transfer: &Transfer,
        parties: &ResolvedParties,
    ) -> Result<PaymentRecord, TransferError> {
        self.assemble_at(transfer, parties, Local::now().naive_local())
    }

    pub fn assemble_at(
        &self,
        transfer: &Transfer,
        parties: &ResolvedParties,
        now: NaiveDateTime,
    ) -> Result<PaymentRecord, TransferError> {
        if transfer.transfer_type == TransferType::Pull
            && parties.customer.status != CustomerStatus::Verified
        {
            return Err(TransferError::CustomerNotVerifiedForPull {
                id: parties.customer.id.to_string(),
                status: parties.customer.status.to_string(),
            });
        }
        if transfer.status != TransferStatus::Pending {
            return Err(TransferError::TransferNotPending {
                id: transfer.id.to_string(),
                status: transfer.status.to_string(),
            });
        }

        let origin = &parties.originator_depository;
        let destination = &parties.customer_depository;

        let (odfi, _) = split_routing_number(&origin.routing_number);
        if odfi.is_empty() {
            return Err(TransferError::InvalidRoutingNumber(origin.routing_number.clone()));
        }
        let (rdfi, check_digit) = split_routing_number(&destination.routing_number);
        if rdfi.is_empty() {
            return Err(TransferError::InvalidRoutingNumber(
                destination.routing_number.clone(),
            ));
        }

        let account_type = match destination.account_type {
            Some(t) => t,
            None => {
                tracing::warn!(
                    transfer_id = %transfer.id,
                    depository_id = %destination.id,
                    fallback = %self.config.fallback_account_type,
                    "Depository has no account type, using fallback"
                );
                self.config.fallback_account_type
            }
        };

        let direction = Direction::from(transfer.transfer_type);
        let trace_number = trace_number(&odfi, transfer.id.as_str());
        let entry_detail_sequence_number = trace_number[trace_number.len() - 7..].to_string();

        let company_name = if parties.originator.metadata.trim().is_empty() {
            self.config.company_name_placeholder.clone()
        } else {
            parties.originator.metadata.clone()
        };

        let effective_date = calendar::next_banking_day(now.date());

        let entry = EntryDetail {
            transaction_code: transaction_code(account_type, direction, EntryMode::Live),
            rdfi_identification: rdfi,
            check_digit,
            dfi_account_number: destination.account_number.clone(),
            amount: transfer.amount.minor_units(),
            identification_number: transfer
                .id
                .as_str()
                .chars()
                .take(IDENTIFICATION_NUMBER_LEN)
                .collect(),
            individual_name: parties.customer.metadata.clone(),
            discretionary_data: transfer.description.clone(),
            trace_number,
            addenda05: vec![Addenda05 {
                type_code: "05".to_string(),
                payment_related_information: self.config.payment_related_information.clone(),
                sequence_number: 1,
                entry_detail_sequence_number,
            }],
        };

        Ok(PaymentRecord {
            id: transfer.id.to_string(),
            file_header: FileHeader {
                immediate_origin: origin.routing_number.clone(),
                immediate_origin_name: origin.bank_name.clone(),
                immediate_destination: destination.routing_number.clone(),
                immediate_destination_name: destination.bank_name.clone(),
                file_creation_date: now.format("%y%m%d").to_string(),
                file_creation_time: now.format("%H%M").to_string(),
            },
            batches: vec![Batch {
                batch_header: BatchHeader {
                    service_class_code: service_class_code(direction),
                    company_name,
                    company_identification: parties.originator.identification.clone(),
                    standard_entry_class_code: transfer.standard_entry_class_code.to_uppercase(),
                    company_entry_description: transfer.description.clone(),
                    effective_entry_date: effective_date.format("%y%m%d").to_string(),
                    odfi_identification: odfi,
                },
                entry_details: vec![entry],
            }],
        })
    }
}

/// ODFI identifier followed by a 7-digit sequence derived from the transfer id
fn trace_number(odfi: &str, transfer_id: &str) -> String {
    let sequence = crc32fast::hash(transfer_id.as_bytes()) % TRACE_SEQUENCE_MODULUS;
    format!("{}{:07}", odfi, sequence)
}
