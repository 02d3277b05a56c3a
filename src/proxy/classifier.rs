//! Anonymity classification from observed header evidence
//!
//! This is a heuristic. It only sees what the single verification target
//! reports back, so a proxy that strips headers differently for other
//! destinations is classified by this one exchange alone.

use crate::proxy::models::Anonymity;
use reqwest::header::HeaderMap;

/// Headers that reveal the original requester or the proxy hop
const IDENTITY_HEADERS: &[&str] = &["via", "x-forwarded-for", "x-real-ip", "client-ip"];

/// Headers that mark the request as forwarded without naming the requester
const FORWARDED_HEADERS: &[&str] = &["forwarded", "x-forwarded-proto", "x-forwarded-host"];

/// Classify a proxy by the headers observed during its verification exchange.
///
/// Checks run in order and the first match wins.
pub fn classify(headers: &HeaderMap) -> Anonymity {
    if IDENTITY_HEADERS.iter().any(|name| headers.contains_key(*name)) {
        Anonymity::Transparent
    } else if FORWARDED_HEADERS.iter().any(|name| headers.contains_key(*name)) {
        Anonymity::Anonymous
    } else {
        Anonymity::Elite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_identity_header_is_transparent() {
        assert_eq!(
            classify(&headers(&[("x-forwarded-for", "198.51.100.7")])),
            Anonymity::Transparent
        );
        assert_eq!(
            classify(&headers(&[("via", "1.1 squid")])),
            Anonymity::Transparent
        );
    }

    #[test]
    fn test_identity_header_wins_over_forwarded_marker() {
        assert_eq!(
            classify(&headers(&[
                ("forwarded", "proto=http"),
                ("x-forwarded-for", "198.51.100.7")
            ])),
            Anonymity::Transparent
        );
    }

    #[test]
    fn test_forwarded_marker_is_anonymous() {
        assert_eq!(
            classify(&headers(&[("forwarded", "proto=http")])),
            Anonymity::Anonymous
        );
    }

    #[test]
    fn test_no_markers_is_elite() {
        assert_eq!(
            classify(&headers(&[("content-type", "application/json")])),
            Anonymity::Elite
        );
        assert_eq!(classify(&HeaderMap::new()), Anonymity::Elite);
    }
}
