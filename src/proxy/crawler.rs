//! Proxy crawler module for fetching candidates from listing sources
//!
//! Each source is fetched with a single request. Transport failures, error
//! statuses and unreadable bodies are reported as source-scoped errors; a
//! page with no recognizable entries is a successful, empty result.

use crate::error::Error;
use crate::proxy::extractor;
use crate::proxy::models::Candidate;
use crate::proxy::sources::ProxySource;
use crate::proxy::user_agents::UserAgentPool;
use log::{info, warn};
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for listing requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Result of crawling a single source
#[derive(Debug)]
pub struct CrawlResult {
    /// The source that was crawled
    pub source: String,
    /// Candidates extracted from the source, or the reason the fetch failed
    pub outcome: Result<Vec<Candidate>, Error>,
}

impl CrawlResult {
    /// Check if the crawl was successful
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Configuration for proxy crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Timeout for each listing request
    pub timeout: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Proxy crawler for fetching candidates from listing pages
#[derive(Clone)]
pub struct ProxyCrawler {
    client: Client,
    user_agents: Arc<UserAgentPool>,
}

impl ProxyCrawler {
    /// Create a new proxy crawler with custom configuration
    pub fn with_config(config: CrawlerConfig, user_agents: Arc<UserAgentPool>) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .no_proxy()
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            client,
            user_agents,
        })
    }

    /// Fetch one source and extract its candidates
    pub async fn fetch_source(&self, source: &ProxySource) -> Result<Vec<Candidate>, Error> {
        let fetch_error = |cause| Error::SourceFetch {
            source_name: source.name.clone(),
            cause,
        };

        let response = self
            .client
            .get(source.url.clone())
            .header(USER_AGENT, self.user_agents.pick())
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.8")
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceStatus {
                source_name: source.name.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(fetch_error)?;
        let candidates = extractor::extract(&body, &source.name);

        if candidates.is_empty() {
            warn!("Source {} returned no recognizable proxies", source.name);
        } else {
            info!("Found {} candidates from {}", candidates.len(), source.name);
        }

        Ok(candidates)
    }

    /// Fetch a source, returning a result that records which source it was
    pub async fn crawl_source(&self, source: &ProxySource) -> CrawlResult {
        CrawlResult {
            source: source.name.clone(),
            outcome: self.fetch_source(source).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::user_agents::FALLBACK_USER_AGENT;
    use crate::test_support::{closed_port, http_response, spawn_server, spawn_silent_server};

    fn crawler(agents: &str, timeout: Duration) -> ProxyCrawler {
        let pool = Arc::new(UserAgentPool::parse_string(agents));
        ProxyCrawler::with_config(CrawlerConfig::new().with_timeout(timeout), pool).unwrap()
    }

    fn source(name: &str, addr: std::net::SocketAddr) -> ProxySource {
        ProxySource::new(name, &format!("http://{}/list", addr)).unwrap()
    }

    #[test]
    fn test_crawler_config_builder() {
        let config = CrawlerConfig::new().with_timeout(Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(
            CrawlerConfig::default().timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[tokio::test]
    async fn test_fetch_source_extracts_candidates() {
        let page = r#"<table><tr data-proxy="203.0.113.5:8080"><td></td></tr>
<tr data-proxy="bad-format"><td></td></tr></table>"#;
        let (addr, requests) = spawn_server(http_response("200 OK", &[], page)).await;

        let crawler = crawler("agent-under-test", Duration::from_secs(5));
        let candidates = crawler.fetch_source(&source("listing", addr)).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].to_simple_string(), "203.0.113.5:8080");
        assert_eq!(candidates[0].source_name, "listing");

        let requests = requests.lock().unwrap();
        assert!(requests[0].to_lowercase().contains("user-agent: agent-under-test"));
    }

    #[tokio::test]
    async fn test_empty_pool_sends_fallback_user_agent() {
        let (addr, requests) = spawn_server(http_response("200 OK", &[], "<html></html>")).await;

        let crawler = crawler("", Duration::from_secs(5));
        let candidates = crawler.fetch_source(&source("empty", addr)).await.unwrap();
        assert!(candidates.is_empty());

        let requests = requests.lock().unwrap();
        assert!(requests[0].contains(FALLBACK_USER_AGENT));
    }

    #[tokio::test]
    async fn test_connection_refused_is_source_error() {
        let addr = closed_port().await;
        let crawler = crawler("agent", Duration::from_secs(5));

        let result = crawler.crawl_source(&source("down", addr)).await;
        assert!(!result.is_success());
        let err = result.outcome.unwrap_err();
        assert!(matches!(err, Error::SourceFetch { .. }));
        assert_eq!(err.source_name(), Some("down"));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_error_status_is_source_error() {
        let (addr, _) = spawn_server(http_response("403 Forbidden", &[], "blocked")).await;
        let crawler = crawler("agent", Duration::from_secs(5));

        let err = crawler.fetch_source(&source("blocked", addr)).await.unwrap_err();
        assert!(matches!(err, Error::SourceStatus { .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let addr = spawn_silent_server().await;
        let crawler = crawler("agent", Duration::from_millis(200));

        let err = crawler.fetch_source(&source("slow", addr)).await.unwrap_err();
        match err {
            Error::SourceFetch { cause, .. } => assert!(cause.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
