//! Paygate - ACH transfer orchestration core
//!
//! Accepts transfer requests on behalf of a user, resolves the parties,
//! assembles an ACH payment record, submits it to the file-building service,
//! and persists the result.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier newtypes (UserId, TransferId, etc.)
//! - [`money`] - Currency-aware amounts in minor units
//! - [`ach`] - Payment record model, code tables, banking calendar, assembler
//! - [`parties`] - Customers, originators, depositories and their resolver
//! - [`transfer`] - Normalizer, coordinator, repositories, orchestration service
//! - [`gateway`] - HTTP API
//! - [`db`] - PostgreSQL pool and schema

// Core types - must be first!
pub mod core_types;

pub mod money;

// Domain
pub mod ach;
pub mod parties;
pub mod transfer;

// Infrastructure
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{CustomerId, DepositoryId, OriginatorId, TransferId, UserId};
pub use money::{Amount, Currency, MoneyError};
pub use transfer::{
    CreateOutcome, Transfer, TransferError, TransferRequest, TransferService, TransferStatus,
    TransferType,
};
