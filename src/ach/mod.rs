//! ACH payment records
//!
//! - [`codes`] - transaction and service class code tables, routing split
//! - [`calendar`] - banking-day arithmetic
//! - [`record`] - the structured record sent to the file service
//! - [`assembler`] - Transfer + parties -> record

pub mod assembler;
pub mod calendar;
pub mod codes;
pub mod record;

pub use assembler::{AssemblerConfig, PaymentAssembler};
pub use codes::{AccountType, Direction, EntryMode};
pub use record::PaymentRecord;
