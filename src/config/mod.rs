//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, HttpConfig, ResolverConfig)
//! - [`security`]: Fingerprint secret and binding policy (SecurityConfig)
//! - [`validation`]: Startup checks that collect every problem at once

mod security;
mod types;
pub mod validation;

pub use security::SecurityConfig;
pub use types::{Config, ConfigError, DatabaseConfig, HttpConfig, ResolverConfig, ServerConfig};
pub use validation::{ValidationError, validate};
