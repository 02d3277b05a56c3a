//! Catalog of proxy listing sources

use crate::error::Error;
use reqwest::Url;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Proxy source representing a website that provides proxy lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySource {
    /// Name of the proxy source
    pub name: String,
    /// URL to fetch proxies from
    pub url: Url,
}

impl ProxySource {
    pub fn new(name: &str, url: &str) -> Result<Self, Error> {
        let parsed = Url::parse(url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| Error::InvalidEndpoint {
                name: name.to_string(),
                url: url.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            url: parsed,
        })
    }
}

/// Mapping from source name to listing endpoint, loaded once per run
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<ProxySource>,
}

impl SourceCatalog {
    pub fn new(sources: Vec<ProxySource>) -> Self {
        Self { sources }
    }

    /// Parse a JSON object of `"name": "url"` pairs.
    ///
    /// Every URL must be an absolute http(s) URL, otherwise the whole catalog
    /// is rejected.
    pub fn parse_json(content: &str, path: &Path) -> Result<Self, Error> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(content).map_err(|source| Error::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;

        let sources = entries
            .iter()
            .map(|(name, url)| ProxySource::new(name, url))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sources })
    }

    /// Load the catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&content, path)
    }

    pub fn sources(&self) -> &[ProxySource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
