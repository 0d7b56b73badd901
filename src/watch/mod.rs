//! Watch-link resolution.
//!
//! - [`model`]: channels, stream sources, event codes and bindings
//! - [`descriptor`]: the playback descriptor returned to viewers
//! - [`store`]: directory / event code store traits
//! - [`sqlite`]: SQLite implementations of those traits
//! - [`resolver`]: the binding policy and orchestration

pub mod descriptor;
#[cfg(test)]
pub(crate) mod memory;
pub mod model;
pub mod resolver;
pub mod sqlite;
pub mod store;

pub use descriptor::{PlaybackDescriptor, PlayerType};
pub use model::{Binding, Channel, CodeStatus, EventCode, StreamSource, StreamType};
pub use resolver::{BootstrapRequest, ResolverPolicy, WatchLinkResolver};
pub use sqlite::{SqliteDirectory, SqliteEventCodeStore};
pub use store::{BindOutcome, ChannelDirectory, EventCodeStore};

use crate::db::Database;
use crate::security::fingerprint::FingerprintHasher;
use std::sync::Arc;

/// Build a resolver over the SQLite-backed stores.
pub fn sqlite_resolver(db: &Database, hasher: FingerprintHasher, policy: ResolverPolicy) -> WatchLinkResolver {
    WatchLinkResolver::new(
        Arc::new(SqliteDirectory::new(db.clone())),
        Arc::new(SqliteEventCodeStore::new(db.clone())),
        hasher,
        policy,
    )
}
