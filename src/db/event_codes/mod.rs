//! Event code repository.
//!
//! Handles code issuance, status changes and the one-time viewer binding.

pub mod models;
pub mod queries;

pub use models::EventCodeRecord;
pub use queries::EventCodeRepository;
