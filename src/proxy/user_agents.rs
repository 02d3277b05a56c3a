//! User agent pool shared by the crawler and the checker

use crate::error::Error;
use log::warn;
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;

/// User agent sent when the pool is empty
pub const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Read-only set of User-Agent header values
#[derive(Debug, Clone, Default)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    pub fn new(agents: Vec<String>) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| agent.trim().to_string())
            .filter(|agent| !agent.is_empty())
            .collect();
        Self { agents }
    }

    /// Parse one user agent per line, skipping blank lines
    pub fn parse_string(content: &str) -> Self {
        Self::new(content.lines().map(String::from).collect())
    }

    /// Load the pool from a file. An empty file yields an empty pool.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::UserAgents {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_string(&content))
    }

    /// Pick a user agent uniformly at random.
    ///
    /// Falls back to [`FALLBACK_USER_AGENT`] with a warning when the pool is empty.
    pub fn pick(&self) -> &str {
        match self.agents.choose(&mut rand::thread_rng()) {
            Some(agent) => agent.as_str(),
            None => {
                warn!("No user agents loaded, using fallback user agent");
                FALLBACK_USER_AGENT
            }
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
