//! File-building service adapter
//!
//! HTTP client for the ACH file service:
//! - `POST /files/create` (header `X-Idempotency-Key`) -> `{"id", "error"}`
//! - `GET /files/{id}/contents`
//! - `GET /files/{id}/validate` -> `{"error"}`
//! - `DELETE /files/{id}`

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{FileService, status_error, transport_error};
use crate::ach::PaymentRecord;
use crate::transfer::error::TransferError;

const SERVICE: &str = "ach";
pub const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";

#[derive(Debug, Deserialize)]
struct CreateFileResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateFileResponse {
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpFileService {
    client: Client,
    base_url: String,
}

impl HttpFileService {
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransferError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(SERVICE, status, &body))
    }
}

#[async_trait]
impl FileService for HttpFileService {
    async fn create_file(
        &self,
        idempotency_key: &str,
        record: &PaymentRecord,
    ) -> Result<String, TransferError> {
        let response = self
            .client
            .post(self.url("/files/create"))
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(record)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let body: CreateFileResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        if let Some(err) = body.error.filter(|e| !e.is_empty()) {
            return Err(TransferError::external(SERVICE, err, false));
        }
        if body.id.is_empty() {
            return Err(TransferError::external(
                SERVICE,
                "create file returned no id",
                false,
            ));
        }

        tracing::debug!(file_id = %body.id, "ACH file created");
        Ok(body.id)
    }

    async fn get_file_contents(&self, file_id: &str) -> Result<Vec<u8>, TransferError> {
        let response = self
            .client
            .get(self.url(&format!("/files/{}/contents", file_id)))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        Ok(bytes.to_vec())
    }

    async fn validate_file(&self, file_id: &str) -> Result<(), TransferError> {
        let response = self
            .client
            .get(self.url(&format!("/files/{}/validate", file_id)))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let body: ValidateFileResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        match body.error.filter(|e| !e.is_empty()) {
            Some(err) => Err(TransferError::external(
                SERVICE,
                format!("file {} failed validation: {}", file_id, err),
                false,
            )),
            None => Ok(()),
        }
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), TransferError> {
        let response = self
            .client
            .delete(self.url(&format!("/files/{}", file_id)))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        Self::check(response).await?;
        Ok(())
    }
}
