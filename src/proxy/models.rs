//! Proxy data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Protocol a live proxy was verified to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Protocol {
    #[serde(rename = "HTTP_HTTPS")]
    HttpHttps,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::HttpHttps => write!(f, "HTTP_HTTPS"),
            Protocol::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Anonymity tier derived from the headers seen by the verification target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Anonymity {
    Transparent,
    Anonymous,
    Elite,
    #[default]
    Unknown,
}

impl fmt::Display for Anonymity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anonymity::Transparent => write!(f, "TRANSPARENT"),
            Anonymity::Anonymous => write!(f, "ANONYMOUS"),
            Anonymity::Elite => write!(f, "ELITE"),
            Anonymity::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Unvalidated proxy scraped from a listing, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub address: IpAddr,
    pub port: u16,
    pub source_name: String,
}

impl Candidate {
    pub fn new(address: IpAddr, port: u16, source_name: String) -> Self {
        Self {
            address,
            port,
            source_name,
        }
    }

    /// Get the proxy string in IP:PORT format
    pub fn to_simple_string(&self) -> String {
        match self.address {
            IpAddr::V4(v4) => format!("{}:{}", v4, self.port),
            IpAddr::V6(v6) => format!("[{}]:{}", v6, self.port),
        }
    }

    /// URL used to route requests through this candidate as an HTTP proxy
    pub fn url(&self) -> String {
        format!("http://{}", self.to_simple_string())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_simple_string(), self.source_name)
    }
}

/// Result of one validation attempt
///
/// `protocol` and `anonymity` only carry information when `alive` is true;
/// a dead proxy always reports `Unknown` for both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub candidate: Candidate,
    pub alive: bool,
    pub protocol: Protocol,
    pub response_time_ms: u64,
    pub anonymity: Anonymity,
    pub checked_at: DateTime<Utc>,
}

impl ValidationOutcome {
    pub fn alive(candidate: Candidate, response_time_ms: u64, anonymity: Anonymity) -> Self {
        Self {
            candidate,
            alive: true,
            protocol: Protocol::HttpHttps,
            response_time_ms,
            anonymity,
            checked_at: Utc::now(),
        }
    }

    pub fn dead(candidate: Candidate, response_time_ms: u64) -> Self {
        Self {
            candidate,
            alive: false,
            protocol: Protocol::Unknown,
            response_time_ms,
            anonymity: Anonymity::Unknown,
            checked_at: Utc::now(),
        }
    }

    pub fn status(&self) -> &'static str {
        if self.alive {
            "Alive"
        } else {
            "Dead"
        }
    }
}

/// Formats the outcome as one report line.
///
/// Downstream tooling parses this layout, so field order and labels are fixed.
impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Source: {} | Protocol: {} | Anonymity: {} | Status: {} | Response Time: {}ms",
            self.candidate.to_simple_string(),
            self.candidate.source_name,
            self.protocol,
            self.anonymity,
            self.status(),
            self.response_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate::new("203.0.113.5".parse().unwrap(), 8080, "listing".to_string())
    }

    #[test]
    fn test_candidate_strings() {
        let candidate = candidate();
        assert_eq!(candidate.to_simple_string(), "203.0.113.5:8080");
        assert_eq!(candidate.url(), "http://203.0.113.5:8080");

        let v6 = Candidate::new("2001:db8::1".parse().unwrap(), 3128, "six".to_string());
        assert_eq!(v6.url(), "http://[2001:db8::1]:3128");
    }

    #[test]
    fn test_dead_outcome_carries_no_classification() {
        let outcome = ValidationOutcome::dead(candidate(), 5003);
        assert!(!outcome.alive);
        assert_eq!(outcome.protocol, Protocol::Unknown);
        assert_eq!(outcome.anonymity, Anonymity::Unknown);
        assert_eq!(outcome.response_time_ms, 5003);
    }

    #[test]
    fn test_report_line_layout() {
        let outcome = ValidationOutcome::alive(candidate(), 142, Anonymity::Elite);
        assert_eq!(
            outcome.to_string(),
            "203.0.113.5:8080 | Source: listing | Protocol: HTTP_HTTPS | Anonymity: ELITE | Status: Alive | Response Time: 142ms"
        );

        let outcome = ValidationOutcome::dead(candidate(), 12);
        assert_eq!(
            outcome.to_string(),
            "203.0.113.5:8080 | Source: listing | Protocol: UNKNOWN | Anonymity: UNKNOWN | Status: Dead | Response Time: 12ms"
        );
    }

    #[test]
    fn test_outcome_serializes_tier_names() {
        let outcome = ValidationOutcome::alive(candidate(), 10, Anonymity::Transparent);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["anonymity"], "TRANSPARENT");
        assert_eq!(json["protocol"], "HTTP_HTTPS");
        assert_eq!(json["candidate"]["source_name"], "listing");
    }
}
