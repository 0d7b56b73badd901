//! Integration test common infrastructure.
//!
//! Provides utilities for seeding a database, spawning the service binary
//! against it, and issuing viewer requests.

pub mod server;

#[allow(unused_imports)]
pub use server::{TestServer, TestServerOptions};
