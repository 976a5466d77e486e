//! Transfer pipeline
//!
//! Turns a request body into persisted, submitted transfers.
//!
//! # Flow
//!
//! ```text
//! body → normalize → [resolve parties → assemble record → submit file] × N
//!      → audit events → persist batch (one transaction) → ledger (best effort)
//! ```
//!
//! # State Machine
//!
//! ```text
//! PENDING → PROCESSED → RECLAIMED
//!    ↓
//! FAILED | RECLAIMED | CANCELED
//! ```
//!
//! # Invariants
//!
//! 1. **Replay first**: a seen idempotency key short-circuits before any parsing
//! 2. **All or nothing**: a failing request aborts the batch; submitted files are deleted
//! 3. **User scope**: every read and write filters on the caller's user id

pub mod adapters;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod events;
pub mod idempotency;
pub mod request;
pub mod service;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;


// Re-exports for convenience
pub use coordinator::SubmissionCoordinator;
pub use db::{TransferDb, TransferRepository};
pub use error::{ErrorKind, TransferError};
pub use events::{Event, EventDb, EventRepository};
pub use idempotency::IdempotencyStore;
pub use request::read_transfer_requests;
pub use service::{CreateOutcome, TransferService};
pub use state::TransferStatus;
pub use types::{Transfer, TransferRequest, TransferType};
