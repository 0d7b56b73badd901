//! HTTP surface.
//!
//! - `GET /api/public/watch/:org/:team?code=...` - resolve a watch link
//! - `GET /healthz` - liveness
//! - `GET /metrics` - Prometheus scrape endpoint

use crate::error::ResolveError;
use crate::watch::{BootstrapRequest, PlaybackDescriptor, WatchLinkResolver};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::{HeaderMap, StatusCode, header};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<WatchLinkResolver>,
    trusted_proxies: Arc<[IpNet]>,
}

impl AppState {
    pub fn new(resolver: Arc<WatchLinkResolver>, trusted_proxies: Vec<IpNet>) -> Self {
        Self {
            resolver,
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WatchQuery {
    code: Option<String>,
}

/// JSON body for failed resolutions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // store details stay in the logs
        let message = match &self {
            ResolveError::Transient(_) => "temporarily unavailable, retry shortly".to_string(),
            other => other.to_string(),
        };
        let body = Json(ErrorBody {
            error: self.error_code().to_string(),
            message,
        });

        if self.is_retryable() {
            (status, [(header::RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Pick the viewer address for a request.
///
/// The TCP peer is used unless it is a trusted proxy. In that case the
/// `X-Forwarded-For` chain is walked right to left, skipping trusted hops,
/// and the first untrusted address is the viewer. Entries left of that
/// point were supplied by the client and are ignored. An unparseable hop
/// ends the walk, since nothing before it can be attributed to a proxy.
pub fn viewer_ip(peer: IpAddr, headers: &HeaderMap, trusted_proxies: &[IpNet]) -> IpAddr {
    let is_trusted = |ip: &IpAddr| trusted_proxies.iter().any(|net| net.contains(ip));

    let peer = peer.to_canonical();
    if !is_trusted(&peer) {
        return peer;
    }

    let hops: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    let mut viewer = peer;
    for hop in hops.into_iter().rev() {
        let Ok(ip) = hop.parse::<IpAddr>() else {
            break;
        };
        viewer = ip.to_canonical();
        if !is_trusted(&viewer) {
            break;
        }
    }
    viewer
}

async fn bootstrap_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((org, team)): Path<(String, String)>,
    Query(query): Query<WatchQuery>,
    headers: HeaderMap,
) -> Result<Json<PlaybackDescriptor>, ResolveError> {
    let request = BootstrapRequest {
        org_short_name: org,
        team_slug: team,
        event_code: query.code,
        viewer_ip: viewer_ip(peer.ip(), &headers, &state.trusted_proxies),
    };

    state.resolver.get_public_bootstrap(request).await.map(Json)
}

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/public/watch/:org/:team", get(bootstrap_handler))
        .route("/healthz", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Serve the router on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

/// Bind `addr` and serve.
pub async fn run_http_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(address = %listener.local_addr()?, "HTTP server listening");
    serve(listener, state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use http::HeaderValue;

    fn trusted() -> Vec<IpNet> {
        vec!["10.0.0.0/8".parse().unwrap(), "::1/128".parse().unwrap()]
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn untrusted_peer_ignores_forwarded_header() {
        let ip = viewer_ip("203.0.113.9".parse().unwrap(), &forwarded("198.51.100.1"), &trusted());
        assert_eq!(ip, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn client_supplied_entry_cannot_override_proxy_appended_address() {
        let ip = viewer_ip(
            "10.0.0.5".parse().unwrap(),
            &forwarded("1.2.3.4, 203.0.113.50"),
            &trusted(),
        );
        assert_eq!(ip, "203.0.113.50".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn chained_trusted_proxies_are_skipped() {
        let ip = viewer_ip(
            "10.1.1.1".parse().unwrap(),
            &forwarded("6.6.6.6, 198.51.100.1, 10.1.1.2"),
            &trusted(),
        );
        assert_eq!(ip, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn repeated_headers_form_one_chain() {
        let mut headers = forwarded("6.6.6.6");
        headers.append("x-forwarded-for", HeaderValue::from_static("198.51.100.2, 10.9.9.9"));
        let ip = viewer_ip("10.1.1.1".parse().unwrap(), &headers, &trusted());
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn garbage_hop_stops_the_walk() {
        // a forged "garbage, 1.2.3.4" prefix must not become the viewer
        let ip = viewer_ip(
            "10.1.1.1".parse().unwrap(),
            &forwarded("1.2.3.4, garbage, 10.1.1.2"),
            &trusted(),
        );
        assert_eq!(ip, "10.1.1.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn all_trusted_chain_yields_leftmost_hop() {
        let ip = viewer_ip("10.1.1.1".parse().unwrap(), &forwarded("10.3.3.3, 10.2.2.2"), &trusted());
        assert_eq!(ip, "10.3.3.3".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn trusted_proxy_without_header_falls_back_to_peer() {
        let ip = viewer_ip("::1".parse().unwrap(), &HeaderMap::new(), &trusted());
        assert_eq!(ip, "::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn mapped_peer_is_canonicalised() {
        let ip = viewer_ip("::ffff:10.2.3.4".parse().unwrap(), &forwarded("198.51.100.7"), &trusted());
        assert_eq!(ip, "198.51.100.7".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn forbidden_maps_to_403_json() {
        let response = ResolveError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "forbidden");
        assert_eq!(body.message, "event code bound to a different network");
    }

    #[tokio::test]
    async fn transient_hides_details_and_sets_retry_after() {
        let response = ResolveError::Transient("sqlite: disk I/O error".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "transient");
        assert!(!body.message.contains("sqlite"));
    }
}
