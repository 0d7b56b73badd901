//! watchgate - watch-link resolution and event-code binding for paid livestreams.
//!
//! Viewers request `{org}/{team}` with an optional event code. Codes bind to
//! the keyed fingerprint of the first network that uses them; later requests
//! from other networks are refused.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod metrics;
pub mod security;
pub mod telemetry;
pub mod watch;
