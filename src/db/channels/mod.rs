//! Channel repository.
//!
//! Handles channel creation and the org/team directory lookup.

pub mod models;
pub mod queries;

pub use models::{ChannelRecord, NewChannel};
pub use queries::ChannelRepository;
