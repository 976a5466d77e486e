//! In-memory repositories and call-counting service mocks for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::adapters::{FileService, LedgerClient};
use super::coordinator::SubmissionCoordinator;
use super::db::{TransferRepository, check_transition, prepare_for_insert};
use super::error::TransferError;
use super::events::{Event, EventRepository};
use super::idempotency::IdempotencyStore;
use super::service::TransferService;
use super::state::TransferStatus;
use super::types::{Amount, Transfer, TransferId, TransferRequest, TransferType, UserId};
use crate::ach::codes::AccountType;
use crate::ach::record::{Batch, BatchHeader, FileHeader};
use crate::ach::{AssemblerConfig, PaymentAssembler, PaymentRecord};
use crate::core_types::{CustomerId, DepositoryId, OriginatorId};
use crate::parties::models::{
    Customer, CustomerStatus, Depository, DepositoryStatus, Originator,
};
use crate::parties::repository::{CustomerRepository, DepositoryRepository, OriginatorRepository};
use crate::parties::resolver::PartyResolver;

// ============================================================================
// Fixtures
// ============================================================================

pub fn sample_request() -> TransferRequest {
    TransferRequest {
        transfer_type: TransferType::Push,
        amount: Amount::usd(12_500),
        originator: "orig1".into(),
        originator_depository: "odep1".into(),
        customer: "cust1".into(),
        customer_depository: "cdep1".into(),
        description: "payroll".into(),
        standard_entry_class_code: "PPD".into(),
        same_day: false,
    }
}

pub fn sample_body() -> serde_json::Value {
    serde_json::json!({
        "transferType": "push",
        "amount": "USD 125.00",
        "originator": "orig1",
        "originatorDepository": "odep1",
        "customer": "cust1",
        "customerDepository": "cdep1",
        "description": "payroll",
        "standardEntryClassCode": "PPD"
    })
}

pub fn sample_record(id: &str) -> PaymentRecord {
    PaymentRecord {
        id: id.to_string(),
        file_header: FileHeader {
            immediate_origin: "121042882".into(),
            immediate_origin_name: "Origin Bank".into(),
            immediate_destination: "123456780".into(),
            immediate_destination_name: "Receiver Bank".into(),
            file_creation_date: "240308".into(),
            file_creation_time: "1405".into(),
        },
        batches: vec![Batch {
            batch_header: BatchHeader {
                service_class_code: 220,
                company_name: "Acme Corp".into(),
                company_identification: "121042882".into(),
                standard_entry_class_code: "PPD".into(),
                company_entry_description: "payroll".into(),
                effective_entry_date: "240311".into(),
                odfi_identification: "12104288".into(),
            },
            entry_details: vec![],
        }],
    }
}

// ============================================================================
// Parties
// ============================================================================

#[derive(Default)]
pub struct InMemoryParties {
    customers: Mutex<HashMap<CustomerId, Customer>>,
    originators: Mutex<HashMap<OriginatorId, Originator>>,
    depositories: Mutex<HashMap<DepositoryId, Depository>>,
}

impl InMemoryParties {
    pub fn insert_customer(&self, c: Customer) {
        self.customers.lock().unwrap().insert(c.id.clone(), c);
    }

    pub fn insert_originator(&self, o: Originator) {
        self.originators.lock().unwrap().insert(o.id.clone(), o);
    }

    pub fn insert_depository(&self, d: Depository) {
        self.depositories.lock().unwrap().insert(d.id.clone(), d);
    }

    pub fn update_customer(&self, id: &str, f: impl FnOnce(&mut Customer)) {
        if let Some(c) = self.customers.lock().unwrap().get_mut(&CustomerId::new(id)) {
            f(c);
        }
    }

    pub fn update_depository(&self, id: &str, f: impl FnOnce(&mut Depository)) {
        if let Some(d) = self.depositories.lock().unwrap().get_mut(&DepositoryId::new(id)) {
            f(d);
        }
    }
}

/// Verified customer `cust1`, originator `orig1` and depositories `cdep1` / `odep1`
pub fn seed_parties(parties: &InMemoryParties, user_id: &str) {
    parties.insert_customer(Customer {
        id: "cust1".into(),
        user_id: user_id.into(),
        metadata: "Jane Doe".into(),
        email: "jane@example.com".into(),
        status: CustomerStatus::Verified,
    });
    parties.insert_depository(Depository {
        id: "cdep1".into(),
        user_id: user_id.into(),
        bank_name: "Receiver Bank".into(),
        holder: "Jane Doe".into(),
        account_type: Some(AccountType::Checking),
        routing_number: "123456780".into(),
        account_number: "987654321".into(),
        status: DepositoryStatus::Verified,
    });
    parties.insert_originator(Originator {
        id: "orig1".into(),
        user_id: user_id.into(),
        default_depository: "odep1".into(),
        identification: "121042882".into(),
        metadata: "Acme Corp".into(),
    });
    parties.insert_depository(Depository {
        id: "odep1".into(),
        user_id: user_id.into(),
        bank_name: "Origin Bank".into(),
        holder: "Acme Corp".into(),
        account_type: Some(AccountType::Checking),
        routing_number: "121042882".into(),
        account_number: "1111".into(),
        status: DepositoryStatus::Verified,
    });
}

#[async_trait]
impl CustomerRepository for InMemoryParties {
    async fn get_user_customer(
        &self,
        id: &CustomerId,
        user_id: &UserId,
    ) -> Result<Option<Customer>, TransferError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .get(id)
            .filter(|c| &c.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl OriginatorRepository for InMemoryParties {
    async fn get_user_originator(
        &self,
        id: &OriginatorId,
        user_id: &UserId,
    ) -> Result<Option<Originator>, TransferError> {
        Ok(self
            .originators
            .lock()
            .unwrap()
            .get(id)
            .filter(|o| &o.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl DepositoryRepository for InMemoryParties {
    async fn get_user_depository(
        &self,
        id: &DepositoryId,
        user_id: &UserId,
    ) -> Result<Option<Depository>, TransferError> {
        Ok(self
            .depositories
            .lock()
            .unwrap()
            .get(id)
            .filter(|d| &d.user_id == user_id)
            .cloned())
    }
}

// ============================================================================
// File service / ledger
// ============================================================================

#[derive(Default)]
pub struct MockFileService {
    create_count: AtomicUsize,
    contents_count: AtomicUsize,
    validate_count: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    fail_create: AtomicBool,
    fail_contents: AtomicBool,
    fail_validate: AtomicBool,
    /// Fail creation for records whose description matches
    fail_create_for: Mutex<Option<String>>,
}

impl MockFileService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_contents(&self, fail: bool) {
        self.fail_contents.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_validate(&self, fail: bool) {
        self.fail_validate.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create_for_description(&self, description: &str) {
        *self.fail_create_for.lock().unwrap() = Some(description.to_string());
    }

    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn contents_count(&self) -> usize {
        self.contents_count.load(Ordering::SeqCst)
    }

    pub fn validate_count(&self) -> usize {
        self.validate_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.create_count() + self.contents_count() + self.validate_count() + self.delete_count()
    }
}

#[async_trait]
impl FileService for MockFileService {
    async fn create_file(
        &self,
        idempotency_key: &str,
        record: &PaymentRecord,
    ) -> Result<String, TransferError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        let description = record
            .batch_header()
            .map(|b| b.company_entry_description.clone());
        let fail_for = self.fail_create_for.lock().unwrap().clone();
        if self.fail_create.load(Ordering::SeqCst) || (fail_for.is_some() && fail_for == description)
        {
            return Err(TransferError::external("ach", "create failed", false));
        }
        Ok(format!("file-{}", idempotency_key))
    }

    async fn get_file_contents(&self, _file_id: &str) -> Result<Vec<u8>, TransferError> {
        self.contents_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_contents.load(Ordering::SeqCst) {
            return Err(TransferError::external("ach", "build failed", true));
        }
        Ok(b"101 ...".to_vec())
    }

    async fn validate_file(&self, _file_id: &str) -> Result<(), TransferError> {
        self.validate_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_validate.load(Ordering::SeqCst) {
            return Err(TransferError::external("ach", "invalid batch", false));
        }
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), TransferError> {
        self.deleted.lock().unwrap().push(file_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockLedger {
    posted: AtomicUsize,
    fail: AtomicBool,
}

impl MockLedger {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn posted(&self) -> usize {
        self.posted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn post_transfer(
        &self,
        _user_id: &UserId,
        _transfer: &Transfer,
    ) -> Result<(), TransferError> {
        self.posted.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransferError::external("ledger", "unavailable", true));
        }
        Ok(())
    }
}

// ============================================================================
// Transfers / events
// ============================================================================

struct StoredTransfer {
    user_id: UserId,
    transfer: Transfer,
    deleted: bool,
}

/// Mirrors `TransferDb`: all-or-nothing batches, soft delete, CAS status updates
#[derive(Default)]
pub struct InMemoryTransfers {
    rows: Mutex<Vec<StoredTransfer>>,
    fail_create: AtomicBool,
}

impl InMemoryTransfers {
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Rows including soft-deleted ones
    pub fn raw_len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TransferRepository for InMemoryTransfers {
    async fn get_user_transfers(&self, user_id: &UserId) -> Result<Vec<Transfer>, TransferError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.user_id == user_id && !r.deleted)
            .map(|r| r.transfer.clone())
            .collect())
    }

    async fn get_user_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Option<Transfer>, TransferError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.transfer.id == id && &r.user_id == user_id && !r.deleted)
            .map(|r| r.transfer.clone()))
    }

    async fn get_file_id_for_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<Option<String>, TransferError> {
        Ok(self
            .get_user_transfer(id, user_id)
            .await?
            .and_then(|t| t.file_id))
    }

    async fn create_user_transfers(
        &self,
        user_id: &UserId,
        transfers: &[Transfer],
    ) -> Result<Vec<Transfer>, TransferError> {
        let prepared = prepare_for_insert(transfers)?;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(TransferError::DatabaseError("connection reset".into()));
        }

        let mut rows = self.rows.lock().unwrap();
        if let Some(dup) = prepared
            .iter()
            .find(|t| rows.iter().any(|r| r.transfer.id == t.id))
        {
            return Err(TransferError::DatabaseError(format!(
                "duplicate key: {}",
                dup.id
            )));
        }
        rows.extend(prepared.iter().cloned().map(|transfer| StoredTransfer {
            user_id: user_id.clone(),
            transfer,
            deleted: false,
        }));
        Ok(prepared)
    }

    async fn delete_user_transfer(
        &self,
        id: &TransferId,
        user_id: &UserId,
    ) -> Result<u64, TransferError> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|r| &r.transfer.id == id && &r.user_id == user_id && !r.deleted)
        {
            Some(row) => {
                row.deleted = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_status_if(
        &self,
        id: &TransferId,
        expected: TransferStatus,
        next: TransferStatus,
    ) -> Result<bool, TransferError> {
        check_transition(id, expected, next)?;
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|r| &r.transfer.id == id && !r.deleted && r.transfer.status == expected)
        {
            Some(row) => {
                row.transfer.status = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryEvents {
    events: Mutex<Vec<(UserId, Event)>>,
    fail: AtomicBool,
}

impl InMemoryEvents {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEvents {
    async fn write_event(&self, user_id: &UserId, event: &Event) -> Result<(), TransferError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransferError::DatabaseError("events unavailable".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push((user_id.clone(), event.clone()));
        Ok(())
    }

    async fn get_transfer_events(
        &self,
        transfer_id: &TransferId,
        user_id: &UserId,
    ) -> Result<Vec<Event>, TransferError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, e)| u == user_id && e.transfer_id.as_ref() == Some(transfer_id))
            .map(|(_, e)| e.clone())
            .collect())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A `TransferService` wired to in-memory collaborators, with handles to inspect them
pub struct Harness {
    pub parties: Arc<InMemoryParties>,
    pub files: Arc<MockFileService>,
    pub ledger: Arc<MockLedger>,
    pub transfers: Arc<InMemoryTransfers>,
    pub events: Arc<InMemoryEvents>,
    pub service: Arc<TransferService>,
}

impl Harness {
    /// Parties seeded for `user_id`
    pub fn new(user_id: &str) -> Self {
        Self::with_ttl(user_id, Duration::from_secs(3600))
    }

    pub fn with_ttl(user_id: &str, ttl: Duration) -> Self {
        let parties = Arc::new(InMemoryParties::default());
        seed_parties(&parties, user_id);
        let files = Arc::new(MockFileService::new());
        let ledger = Arc::new(MockLedger::default());
        let transfers = Arc::new(InMemoryTransfers::default());
        let events = Arc::new(InMemoryEvents::default());

        let service = Arc::new(TransferService::new(
            PartyResolver::new(parties.clone(), parties.clone(), parties.clone()),
            PaymentAssembler::new(AssemblerConfig::default()),
            SubmissionCoordinator::new(files.clone()),
            transfers.clone(),
            events.clone(),
            ledger.clone(),
            Arc::new(IdempotencyStore::new(ttl)),
        ));

        Self {
            parties,
            files,
            ledger,
            transfers,
            events,
            service,
        }
    }
}
