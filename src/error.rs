//! Error types for a harvesting run

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or running a harvest.
///
/// Only startup and output errors abort a run. A source fetch error is
/// scoped to one source and the pipeline logs it and moves on. A dead
/// proxy is never an error: it is reported as an outcome with `alive = false`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read user agent list {path:?}: {source}")]
    UserAgents { path: PathBuf, source: io::Error },

    #[error("failed to read source catalog {path:?}: {source}")]
    CatalogRead { path: PathBuf, source: io::Error },

    #[error("malformed source catalog {path:?}: {source}")]
    CatalogParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("source {name} has an invalid endpoint {url:?}")]
    InvalidEndpoint { name: String, url: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to fetch source {source_name}: {cause}")]
    SourceFetch {
        source_name: String,
        #[source]
        cause: reqwest::Error,
    },

    #[error("source {source_name} answered with HTTP status {status}")]
    SourceStatus {
        source_name: String,
        status: StatusCode,
    },

    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    /// Whether this error must terminate the run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::SourceFetch { .. } | Error::SourceStatus { .. }
        )
    }

    /// Name of the source this error is scoped to, if any
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Error::SourceFetch { source_name, .. } | Error::SourceStatus { source_name, .. } => {
                Some(source_name)
            }
            _ => None,
        }
    }
}
