//! Header helpers shared by handlers and error responses.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use screenpilot_core::Quota;

pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// `X-RateLimit-Remaining` plus `X-RateLimit-Reset` (epoch millis, empty when unknown)
pub fn quota_headers(quota: &Quota) -> [(HeaderName, HeaderValue); 2] {
    let reset = match quota.reset_at {
        Some(at) => HeaderValue::from(at.timestamp_millis()),
        None => HeaderValue::from_static(""),
    };

    [
        (RATE_LIMIT_REMAINING, HeaderValue::from(quota.remaining)),
        (RATE_LIMIT_RESET, reset),
    ]
}

/// Rate-limit key for a request: first `x-forwarded-for` hop, then
/// `x-real-ip`, then `"unknown"`.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let map = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "10.0.0.9"),
        ]);
        assert_eq!(client_identifier(&map), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let map = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_identifier(&map), "198.51.100.2");
    }

    #[test]
    fn test_unknown_fallback() {
        assert_eq!(client_identifier(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_quota_headers_without_reset() {
        let [remaining, reset] = quota_headers(&Quota {
            remaining: 12,
            reset_at: None,
        });
        assert_eq!(remaining.1, "12");
        assert_eq!(reset.1, "");
    }
}
