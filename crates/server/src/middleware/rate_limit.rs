//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Sign-up, login and the Google redirect share one strict per-IP limiter
//! (~10/min). The client IP comes from proxy headers when present, otherwise
//! from the peer address (`ConnectInfo`, set by `main`). Limiter failures
//! render as the usual JSON error body.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

/// Proxy headers carrying the client address, most trusted first.
///
/// `x-forwarded-for` may hold a chain; only its first entry is used.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Keys requests by the client IP reported by the fronting proxy, falling back
/// to the TCP peer address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                let value = headers.get(*name)?.to_str().ok()?;
                value.split(',').next()?.trim().parse::<IpAddr>().ok()
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(peer)| peer.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Render a limiter failure as an [`AppError`] response.
fn limiter_error_response(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::info!(retry_after_secs = wait_time, "Auth rate limit hit");
            let mut response = AppError::RateLimited {
                retry_after_secs: wait_time,
            }
            .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("no client address for rate limiting".to_string()).into_response()
        }
        GovernorError::Other { code, msg, .. } => AppError::Internal(format!(
            "rate limiter failed with {code}: {}",
            msg.unwrap_or_default()
        ))
        .into_response(),
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Governor layer keyed by [`ClientIpKeyExtractor`].
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter for `/auth/*`: one token every 6 seconds, bursts of 5.
///
/// # Panics
///
/// Never in practice: `GovernorConfigBuilder` only rejects a zero period or
/// burst size.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(limiter_error_response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/auth/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_prefers_connecting_ip_header() {
        let req = request(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "203.0.113.7"),
        ]);
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_uses_first_forwarded_address() {
        let req = request(&[("x-forwarded-for", "198.51.100.4, 10.0.0.1")]);
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_skips_unparseable_header() {
        let req = request(&[("cf-connecting-ip", "unknown"), ("x-real-ip", " 192.0.2.9 ")]);
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request(&[]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 52100))));
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_header_wins_over_peer_address() {
        let mut req = request(&[("x-forwarded-for", "198.51.100.4")]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 443))));
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_limit_hit_renders_json_error() {
        let response = limiter_error_response(GovernorError::TooManyRequests {
            wait_time: 4,
            headers: None,
        });
        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "rate_limited");
    }

    #[test]
    fn test_rejects_request_without_ip_headers() {
        let req = request(&[]);
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
