//! HTTP handlers
//!
//! - [`transfer`]: Transfer CRUD, events, and acknowledgement endpoints
//! - [`health`]: Liveness and database health

pub mod health;
pub mod transfer;

pub use health::{HealthResponse, health_check};
pub use transfer::{
    create_transfers, create_transfers_batch, delete_transfer, get_transfer, get_transfer_events,
    list_transfers, transfer_failed, transfer_files,
};
