//! Proxy checker module for validating candidates
//!
//! A candidate is exercised as a forwarding HTTP proxy towards a fixed
//! verification target. There is exactly one attempt per candidate and the
//! timeout is deliberately short, so slow but working proxies can be
//! reported dead.

use crate::error::Error;
use crate::proxy::classifier;
use crate::proxy::models::{Candidate, ValidationOutcome};
use crate::proxy::user_agents::UserAgentPool;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Proxy as ReqwestProxy};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default timeout for proxy checks in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default URL to test proxies against. It echoes the request headers it saw.
const DEFAULT_TEST_URL: &str = "http://httpbin.org/headers";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// URL to test proxies against
    pub test_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            test_url: DEFAULT_TEST_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }
}

/// Body shape of header-echo endpoints such as httpbin's `/headers`
#[derive(Debug, Deserialize)]
struct HeaderEcho {
    headers: HashMap<String, serde_json::Value>,
}

/// Why a check failed, kept for debug logging only
#[derive(Debug)]
enum CheckFailure {
    Client(reqwest::Error),
    Request(reqwest::Error),
    Status(reqwest::StatusCode),
    Timeout,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::Client(e) => write!(f, "client setup failed: {}", e),
            CheckFailure::Request(e) => write!(f, "request failed: {}", e),
            CheckFailure::Status(status) => write!(f, "HTTP status: {}", status),
            CheckFailure::Timeout => write!(f, "timed out"),
        }
    }
}

/// Proxy checker for validating candidates
#[derive(Clone)]
pub struct ProxyChecker {
    config: CheckerConfig,
    user_agents: Arc<UserAgentPool>,
}

impl ProxyChecker {
    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig, user_agents: Arc<UserAgentPool>) -> Self {
        Self {
            config,
            user_agents,
        }
    }

    /// Validate a single candidate.
    ///
    /// Always returns an outcome, and the elapsed time is recorded whether the
    /// attempt succeeded or not.
    pub async fn validate(&self, candidate: Candidate) -> ValidationOutcome {
        let start = Instant::now();
        let result =
            match tokio::time::timeout(self.config.timeout, self.round_trip(&candidate)).await {
                Ok(result) => result,
                Err(_) => Err(CheckFailure::Timeout),
            };
        let elapsed = start.elapsed().as_millis() as u64;

        match result {
            Ok(headers) => {
                let anonymity = classifier::classify(&headers);
                ValidationOutcome::alive(candidate, elapsed, anonymity)
            }
            Err(failure) => {
                debug!("Proxy {} failed validation: {}", candidate, failure);
                ValidationOutcome::dead(candidate, elapsed)
            }
        }
    }

    /// Perform the proxied request and collect the header evidence it yields
    async fn round_trip(&self, candidate: &Candidate) -> Result<HeaderMap, CheckFailure> {
        let client = self.create_client(candidate).map_err(CheckFailure::Client)?;

        let response = client
            .get(&self.config.test_url)
            .header(USER_AGENT, self.user_agents.pick())
            .send()
            .await
            .map_err(CheckFailure::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckFailure::Status(status));
        }

        let mut headers = response.headers().clone();
        match response.text().await {
            Ok(body) => merge_echoed_headers(&mut headers, &body),
            Err(e) => debug!("Proxy {} body unreadable: {}", candidate, e),
        }

        Ok(headers)
    }

    /// Create a reqwest client that routes every request through the candidate
    fn create_client(&self, candidate: &Candidate) -> reqwest::Result<Client> {
        let proxy = ReqwestProxy::all(candidate.url())?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .pool_max_idle_per_host(0)
            .build()
    }
}

/// Merge headers echoed back in a JSON body into the observed header set
fn merge_echoed_headers(headers: &mut HeaderMap, body: &str) {
    let echo = match serde_json::from_str::<HeaderEcho>(body) {
        Ok(echo) => echo,
        Err(e) => {
            debug!("Verification body carries no header echo: {}", e);
            return;
        }
    };

    for (name, value) in echo.headers {
        // Only string values are header values; anything else is skipped
        let Some(value) = value.as_str() else {
            continue;
        };
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }
}

/// Check the configured verification target parses before a run starts
pub fn validate_test_url(url: &str) -> Result<(), Error> {
    reqwest::Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|_| ())
        .ok_or_else(|| Error::InvalidEndpoint {
            name: "verification target".to_string(),
            url: url.to_string(),
        })
}
