//! Proxy module for discovering and validating proxies
//!
//! This module provides functionality for:
//! - Loading the user agent pool and the catalog of listing sources
//! - Crawling listing pages and extracting proxy candidates
//! - Checking each candidate through a live proxied request
//! - Classifying live proxies by anonymity tier

pub mod checker;
pub mod classifier;
pub mod crawler;
pub mod extractor;
pub mod models;
pub mod sources;
pub mod user_agents;

pub use checker::{CheckerConfig, ProxyChecker};
pub use crawler::{CrawlResult, CrawlerConfig, ProxyCrawler};
pub use models::{Anonymity, Candidate, Protocol, ValidationOutcome};
pub use sources::{ProxySource, SourceCatalog};
pub use user_agents::{UserAgentPool, FALLBACK_USER_AGENT};
