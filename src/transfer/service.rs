//! Transfer Service
//!
//! Orchestrates transfer creation for one inbound request:
//!
//! ```text
//! idempotency check -> normalize body -> per request:
//!     resolve parties -> validate -> assemble -> submit
//! -> write events -> persist batch (one transaction) -> post to ledger (best effort)
//! ```
//!
//! Any failure before the batch is persisted aborts the whole request and deletes
//! the remote files already created for it.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::adapters::LedgerClient;
use super::coordinator::SubmissionCoordinator;
use super::db::TransferRepository;
use super::error::TransferError;
use super::events::{Event, EventRepository};
use super::idempotency::IdempotencyStore;
use super::request::read_transfer_requests;
use super::state::TransferStatus;
use super::types::{Transfer, TransferId, TransferRequest, UserId};
use crate::ach::PaymentAssembler;
use crate::parties::PartyResolver;

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Idempotency key replayed; nothing was done
    SeenBefore,
    Created(Vec<Transfer>),
}

pub struct TransferService {
    resolver: PartyResolver,
    assembler: PaymentAssembler,
    coordinator: SubmissionCoordinator,
    transfers: Arc<dyn TransferRepository>,
    events: Arc<dyn EventRepository>,
    ledger: Arc<dyn LedgerClient>,
    idempotency: Arc<IdempotencyStore>,
}

impl TransferService {
    pub fn new(
        resolver: PartyResolver,
        assembler: PaymentAssembler,
        coordinator: SubmissionCoordinator,
        transfers: Arc<dyn TransferRepository>,
        events: Arc<dyn EventRepository>,
        ledger: Arc<dyn LedgerClient>,
        idempotency: Arc<IdempotencyStore>,
    ) -> Self {
        Self {
            resolver,
            assembler,
            coordinator,
            transfers,
            events,
            ledger,
            idempotency,
        }
    }

    /// Atomic replay check. Marks the key as seen when it is new.
    pub fn seen_before(&self, user_id: &UserId, idempotency_key: Option<&str>) -> bool {
        match idempotency_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => self.idempotency.check_and_mark(user_id, key),
            None => false,
        }
    }

    pub fn idempotency(&self) -> &Arc<IdempotencyStore> {
        &self.idempotency
    }

    /// Create every transfer in `body` (one object or an array), all or nothing
    pub async fn create_transfers(
        &self,
        user_id: &UserId,
        idempotency_key: Option<&str>,
        body: &[u8],
    ) -> Result<CreateOutcome, TransferError> {
        if self.seen_before(user_id, idempotency_key) {
            info!(user_id = %user_id, "Idempotency key seen before, skipping");
            return Ok(CreateOutcome::SeenBefore);
        }

        let requests = read_transfer_requests(body)?;

        let mut submitted: Vec<Transfer> = Vec::with_capacity(requests.len());
        for req in &requests {
            match self.submit_one(user_id, req).await {
                Ok(transfer) => submitted.push(transfer),
                Err(e) => {
                    self.compensate(&submitted).await;
                    return Err(e);
                }
            }
        }

        for transfer in &submitted {
            if let Err(e) = self
                .events
                .write_event(user_id, &Event::transfer_created(transfer))
                .await
            {
                self.compensate(&submitted).await;
                return Err(e);
            }
        }

        let created = match self
            .transfers
            .create_user_transfers(user_id, &submitted)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                self.compensate(&submitted).await;
                return Err(e);
            }
        };

        self.post_to_ledger(user_id, &created).await;

        info!(user_id = %user_id, count = created.len(), "Transfers created");
        Ok(CreateOutcome::Created(created))
    }

    async fn submit_one(
        &self,
        user_id: &UserId,
        req: &TransferRequest,
    ) -> Result<Transfer, TransferError> {
        let parties = self.resolver.resolve(req, user_id).await?;

        let mut transfer = req.to_transfer(TransferId::generate());
        transfer.validate()?;

        let record = self.assembler.assemble(&transfer, &parties)?;
        let file_id = self
            .coordinator
            .submit(transfer.id.as_str(), &record)
            .await?;

        info!(
            user_id = %user_id,
            transfer_id = %transfer.id,
            file_id = %file_id,
            "Transfer submitted"
        );
        transfer.file_id = Some(file_id);
        Ok(transfer)
    }

    /// Delete remote files of transfers that will not be persisted
    async fn compensate(&self, submitted: &[Transfer]) {
        let file_ids: Vec<&str> = submitted
            .iter()
            .filter_map(|t| t.file_id.as_deref())
            .collect();
        if file_ids.is_empty() {
            return;
        }
        warn!(count = file_ids.len(), "Aborting batch, deleting submitted files");
        join_all(file_ids.into_iter().map(|id| self.coordinator.discard(id))).await;
    }

    async fn post_to_ledger(&self, user_id: &UserId, created: &[Transfer]) {
        let results = join_all(created.iter().map(|t| self.ledger.post_transfer(user_id, t))).await;
        for (transfer, result) in created.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    user_id = %user_id,
                    transfer_id = %transfer.id,
                    error = %e,
                    "Ledger posting failed"
                );
            }
        }
    }

    pub async fn get_transfers(&self, user_id: &UserId) -> Result<Vec<Transfer>, TransferError> {
        self.transfers.get_user_transfers(user_id).await
    }

    pub async fn get_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Transfer, TransferError> {
        self.transfers
            .get_user_transfer(id, user_id)
            .await?
            .ok_or_else(|| TransferError::not_found("transfer", id))
    }

    /// Delete a pending transfer: remote file first (best effort), then soft delete
    pub async fn delete_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<(), TransferError> {
        let transfer = self.get_transfer(id, user_id).await?;
        if transfer.status != TransferStatus::Pending {
            return Err(TransferError::TransferNotPending {
                id: id.to_string(),
                status: transfer.status.to_string(),
            });
        }

        if let Some(file_id) = self.transfers.get_file_id_for_transfer(id, user_id).await? {
            self.coordinator.discard(&file_id).await;
        }

        let affected = self.transfers.delete_user_transfer(id, user_id).await?;
        info!(user_id = %user_id, transfer_id = %id, affected, "Transfer deleted");
        Ok(())
    }

    pub async fn get_transfer_events(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Vec<Event>, TransferError> {
        self.get_transfer(id, user_id).await?;
        self.events.get_transfer_events(id, user_id).await
    }
}
