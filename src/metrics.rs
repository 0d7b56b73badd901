//! Prometheus metrics collection for watchgate.
//!
//! - `watch_resolutions_total{outcome}` - Resolutions by outcome (`ok` or error code)
//! - `watch_event_code_bindings_total` - Event codes bound to a viewer fingerprint
//! - `watch_resolution_duration_seconds` - Resolution latency histogram
//!
//! Recording before [`init`] is a no-op.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Resolutions by outcome.
pub static RESOLUTIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Event code bindings written.
pub static BINDINGS: OnceLock<IntCounter> = OnceLock::new();

/// Resolution latency.
pub static RESOLVE_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(RESOLUTIONS, IntCounterVec::new(Opts::new("watch_resolutions_total", "Watch-link resolutions by outcome"), &["outcome"]));
    register!(BINDINGS, IntCounter::new("watch_event_code_bindings_total", "Event codes bound to a viewer fingerprint"));
    register!(RESOLVE_LATENCY, Histogram::with_opts(
        HistogramOpts::new("watch_resolution_duration_seconds", "Watch-link resolution latency")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a resolution outcome (`ok` or a [`ResolveError`](crate::error::ResolveError) code).
pub fn record_resolution(outcome: &str) {
    if let Some(m) = RESOLUTIONS.get() {
        m.with_label_values(&[outcome]).inc();
    }
}

pub fn record_binding() {
    if let Some(m) = BINDINGS.get() {
        m.inc();
    }
}

pub fn record_resolve_duration(seconds: f64) {
    if let Some(m) = RESOLVE_LATENCY.get() {
        m.observe(seconds);
    }
}
