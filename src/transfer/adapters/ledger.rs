//! Ledger adapter
//!
//! One posting per created transfer. Double-entry rules belong to the ledger
//! service; this side only sends the two legs.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{LedgerClient, status_error, transport_error};
use crate::transfer::error::TransferError;
use crate::transfer::types::{Transfer, TransferType, UserId};

const SERVICE: &str = "ledger";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Posting<'a> {
    id: &'a str,
    user_id: &'a str,
    description: &'a str,
    currency: &'a str,
    lines: [PostingLine<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostingLine<'a> {
    account_id: &'a str,
    purpose: &'static str,
    /// Signed minor units
    amount: i64,
}

fn posting<'a>(user_id: &'a UserId, transfer: &'a Transfer) -> Posting<'a> {
    let amount = transfer.amount.minor_units();
    // Push moves funds originator -> customer, pull the other way
    let (originator_sign, purpose) = match transfer.transfer_type {
        TransferType::Push => (-1, "ACHCredit"),
        TransferType::Pull => (1, "ACHDebit"),
    };

    Posting {
        id: transfer.id.as_str(),
        user_id: user_id.as_str(),
        description: &transfer.description,
        currency: transfer.amount.currency().as_str(),
        lines: [
            PostingLine {
                account_id: transfer.originator_depository.as_str(),
                purpose,
                amount: originator_sign * amount,
            },
            PostingLine {
                account_id: transfer.customer_depository.as_str(),
                purpose,
                amount: -originator_sign * amount,
            },
        ],
    }
}

pub struct HttpLedgerClient {
    client: Client,
    base_url: String,
}

impl HttpLedgerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransferError::SystemError(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn post_transfer(
        &self,
        user_id: &UserId,
        transfer: &Transfer,
    ) -> Result<(), TransferError> {
        let response = self
            .client
            .post(format!("{}/transactions", self.base_url))
            .json(&posting(user_id, transfer))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(SERVICE, status, &body));
        }
        Ok(())
    }
}

/// Used when the ledger is disabled in config
pub struct NoopLedger;

#[async_trait]
impl LedgerClient for NoopLedger {
    async fn post_transfer(
        &self,
        _user_id: &UserId,
        transfer: &Transfer,
    ) -> Result<(), TransferError> {
        tracing::debug!(transfer_id = %transfer.id, "Ledger disabled, skipping posting");
        Ok(())
    }
}
