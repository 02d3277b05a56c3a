//! Proxy Harvest - Proxy Scraper, Checker and Classifier
//!
//! Discovers candidate proxies from public listing pages, verifies each one
//! with a live request through it, classifies the live ones by anonymity and
//! writes a line-oriented report.

pub mod error;
pub mod pipeline;
pub mod proxy;
pub mod report;

#[cfg(test)]
mod test_support;

pub use error::Error;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use proxy::*;
pub use report::{ReportFormat, ReportWriter};

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// User agent list, one per line
    pub user_agents_path: String,
    /// JSON object mapping source names to listing URLs
    pub sources_path: String,
    /// Report destination
    pub output_path: String,
    /// Report layout
    pub report_format: ReportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agents_path: "useragents.txt".to_string(),
            sources_path: "ProxyList.json".to_string(),
            output_path: "validated_proxies.txt".to_string(),
            report_format: ReportFormat::Text,
        }
    }
}
