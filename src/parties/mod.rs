//! Transfer parties
//!
//! Customers, originators and their depositories. This crate reads them; their
//! lifecycle belongs to other services.

pub mod models;
pub mod repository;
pub mod resolver;

pub use models::{Customer, CustomerStatus, Depository, DepositoryStatus, Originator};
pub use repository::{CustomerRepository, DepositoryRepository, OriginatorRepository, PartyDb};
pub use resolver::{PartyResolver, ResolvedParties};
