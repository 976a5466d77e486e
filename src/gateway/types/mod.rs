//! Gateway types module
//!
//! - [`response`]: Success wrapper, problem payloads, error codes

pub mod response;

pub use response::{ApiError, ApiResponse, DeletedData, ProblemPayload, error_codes};
