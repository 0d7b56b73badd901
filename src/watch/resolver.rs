//! Watch-link resolution and event-code binding.
//!
//! A viewer asks for `{org}/{team}[?code=...]`. The resolver decides whether
//! the request may proceed and, if so, which stream to play:
//!
//! ```text
//! channel lookup ──► code required but absent? ──► Unauthorized
//!        │
//!        ▼ code supplied
//! code lookup (missing / inactive ──► Unauthorized)
//!        │
//!        ▼ binding enforced
//! Unbound ──bind(hash(ip))──► proceed
//! Bound(fp) ── fp == hash(ip) ──► proceed
//!           └─ fp != hash(ip) ──► Forbidden
//! ```
//!
//! Bindings are first-use and terminal: once a code is bound, only that
//! network fingerprint may use it.

use super::descriptor::PlaybackDescriptor;
use super::model::{Binding, Channel, EventCode};
use super::store::{BindOutcome, ChannelDirectory, EventCodeStore};
use crate::error::{ResolveError, StoreError};
use crate::security::fingerprint::{Fingerprint, FingerprintHasher};
use crate::telemetry::{ResolveTimer, spans};
use chrono::Utc;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, warn};

/// Operator-controlled resolution policy.
#[derive(Debug, Clone, Copy)]
pub struct ResolverPolicy {
    /// When false, any active code is accepted from any address and nothing is bound.
    pub enforce_ip_binding: bool,
    /// Upper bound on each backing-store call.
    pub store_timeout: Duration,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            enforce_ip_binding: true,
            store_timeout: Duration::from_secs(3),
        }
    }
}

/// One viewer's request for a channel.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub org_short_name: String,
    pub team_slug: String,
    /// An empty string is treated as absent.
    pub event_code: Option<String>,
    pub viewer_ip: IpAddr,
}

pub struct WatchLinkResolver {
    directory: Arc<dyn ChannelDirectory>,
    codes: Arc<dyn EventCodeStore>,
    hasher: FingerprintHasher,
    policy: ResolverPolicy,
}

impl WatchLinkResolver {
    pub fn new(
        directory: Arc<dyn ChannelDirectory>,
        codes: Arc<dyn EventCodeStore>,
        hasher: FingerprintHasher,
        policy: ResolverPolicy,
    ) -> Self {
        Self {
            directory,
            codes,
            hasher,
            policy,
        }
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    /// Resolve a viewer request to a playable stream.
    ///
    /// Either returns a complete descriptor or fails with exactly one
    /// [`ResolveError`] kind. Nothing is retried here.
    pub async fn get_public_bootstrap(
        &self,
        request: BootstrapRequest,
    ) -> Result<PlaybackDescriptor, ResolveError> {
        let _timer = ResolveTimer::new();
        let span = spans::resolve(&request.org_short_name, &request.team_slug);

        let result = self.resolve(&request).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.error_code(),
        };
        crate::metrics::record_resolution(outcome);
        result
    }

    async fn resolve(&self, request: &BootstrapRequest) -> Result<PlaybackDescriptor, ResolveError> {
        let channel = self.load_channel(request).await?;

        let code = request.event_code.as_deref().filter(|c| !c.is_empty());
        match code {
            Some(code) => self.admit_with_code(&channel, code, request.viewer_ip).await?,
            None if channel.require_event_code => {
                debug!(channel_id = channel.id, "Rejected: event code required");
                return Err(ResolveError::CODE_REQUIRED);
            }
            None => {}
        }

        Ok(PlaybackDescriptor::for_channel(&channel))
    }

    async fn load_channel(&self, request: &BootstrapRequest) -> Result<Channel, ResolveError> {
        let found = self
            .bounded(
                self.directory
                    .find_channel(&request.org_short_name, &request.team_slug),
            )
            .await;

        match found {
            Ok(Some(channel)) => Ok(channel),
            Ok(None) => {
                debug!("Rejected: channel not found");
                Err(ResolveError::NotFound)
            }
            Err(StoreError::InvalidRecord(reason)) => {
                warn!(reason = %reason, "Channel has no playable stream configured");
                Err(ResolveError::NotFound)
            }
            Err(e) => Err(transient(e)),
        }
    }

    /// Load an event code, hiding why it is unusable.
    async fn load_active_code(&self, channel: &Channel, code: &str) -> Result<EventCode, ResolveError> {
        let found = self
            .bounded(self.codes.find_by_channel_and_code(channel.id, code))
            .await;

        match found {
            Ok(Some(event_code)) if event_code.is_active() => Ok(event_code),
            Ok(Some(event_code)) => {
                debug!(
                    channel_id = channel.id,
                    event_code_id = event_code.id,
                    status = %event_code.status,
                    "Rejected: event code inactive"
                );
                Err(ResolveError::CODE_INVALID)
            }
            Ok(None) => {
                debug!(channel_id = channel.id, "Rejected: unknown event code");
                Err(ResolveError::CODE_INVALID)
            }
            Err(StoreError::InvalidRecord(reason)) => {
                warn!(channel_id = channel.id, reason = %reason, "Event code record is invalid");
                Err(ResolveError::CODE_INVALID)
            }
            Err(e) => Err(transient(e)),
        }
    }

    async fn admit_with_code(
        &self,
        channel: &Channel,
        code: &str,
        viewer_ip: IpAddr,
    ) -> Result<(), ResolveError> {
        let event_code = self.load_active_code(channel, code).await?;

        if !self.policy.enforce_ip_binding {
            return Ok(());
        }

        let requester = self.hasher.fingerprint(viewer_ip);

        if let Some(binding) = &event_code.binding {
            return check_binding(&event_code, binding, &requester);
        }

        let outcome = self
            .bounded(
                self.codes
                    .bind_to_fingerprint(event_code.id, &requester, Utc::now()),
            )
            .await
            .map_err(transient)?;

        match outcome {
            BindOutcome::Bound => {
                info!(
                    channel_id = channel.id,
                    event_code_id = event_code.id,
                    fingerprint = %requester,
                    "Event code bound to viewer fingerprint"
                );
                crate::metrics::record_binding();
                Ok(())
            }
            BindOutcome::AlreadyBound => {
                // Lost a race: judge against whatever binding won.
                let reread = self.load_active_code(channel, code).await?;
                match &reread.binding {
                    Some(binding) => check_binding(&reread, binding, &requester),
                    None => Err(ResolveError::Transient(
                        "event code binding not visible after conflicting bind".to_string(),
                    )),
                }
            }
        }
    }

    /// Apply the store timeout to one backing-store call.
    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.policy.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.policy.store_timeout)),
        }
    }
}

fn check_binding(
    event_code: &EventCode,
    binding: &Binding,
    requester: &Fingerprint,
) -> Result<(), ResolveError> {
    if binding.fingerprint.matches(requester) {
        Ok(())
    } else {
        info!(
            event_code_id = event_code.id,
            bound_at = %binding.bound_at,
            fingerprint = %requester,
            "Rejected: event code bound to a different network"
        );
        Err(ResolveError::Forbidden)
    }
}

fn transient(err: StoreError) -> ResolveError {
    warn!(error = %err, "Backing store failure during resolution");
    ResolveError::Transient(err.to_string())
}
