//! Telemetry utilities for resolution timing and span construction.

use std::time::Instant;

/// Guard for timing a resolution and recording its latency.
///
/// Records when dropped, so early returns are measured too.
pub struct ResolveTimer {
    start: Instant,
}

impl ResolveTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for ResolveTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResolveTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_resolve_duration(duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one watch-link resolution.
    pub fn resolve(org: &str, team: &str) -> Span {
        info_span!("resolve", org = %org, team = %team)
    }
}
