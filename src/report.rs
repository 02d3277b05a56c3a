//! Report writer fed by the single report-phase consumer

use crate::error::Error;
use crate::proxy::ValidationOutcome;
use clap::ValueEnum;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Output layout of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// `address:port | Source: ... | Response Time: Nms` lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes one line per validation outcome, in the order outcomes are given
pub struct ReportWriter<W> {
    inner: BufWriter<W>,
    format: ReportFormat,
    lines: usize,
}

impl ReportWriter<File> {
    /// Create (or truncate) the report file
    pub async fn create<P: AsRef<Path>>(path: P, format: ReportFormat) -> Result<Self, Error> {
        let file = File::create(path).await.map_err(Error::Output)?;
        Ok(Self::new(file, format))
    }
}

impl<W: AsyncWrite + Unpin> ReportWriter<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self {
            inner: BufWriter::new(writer),
            format,
            lines: 0,
        }
    }

    pub async fn write_outcome(&mut self, outcome: &ValidationOutcome) -> Result<(), Error> {
        let mut line = match self.format {
            ReportFormat::Text => outcome.to_string(),
            ReportFormat::Json => serde_json::to_string(outcome)
                .map_err(|e| Error::Output(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?,
        };
        line.push('\n');

        self.inner
            .write_all(line.as_bytes())
            .await
            .map_err(Error::Output)?;
        self.lines += 1;
        Ok(())
    }

    /// Flush buffered lines to the underlying writer
    pub async fn finish(&mut self) -> Result<(), Error> {
        self.inner.flush().await.map_err(Error::Output)
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}
