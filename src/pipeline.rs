//! Harvesting pipeline: fetch, validate, report
//!
//! One task per source pushes candidates onto a bounded intake channel as
//! soon as its page is extracted. A dispatcher takes candidates off the
//! intake channel and spawns one validation task per candidate, holding a
//! semaphore permit for each so at most `max_in_flight` validations run at
//! once. Outcomes are drained by the caller's task, which is the only writer
//! of the report. Report order is completion order and is not stable
//! between runs.

use crate::error::Error;
use crate::proxy::{Candidate, ProxyChecker, ProxyCrawler, ProxySource, SourceCatalog, ValidationOutcome};
use crate::report::ReportWriter;
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, watch, Semaphore};

/// Default number of validations allowed in flight at once
const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Default capacity of the intake and result channels
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for the pipeline's concurrency limits
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on concurrently running validations
    pub max_in_flight: usize,
    /// Capacity of the channels between phases
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// Counters describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub alive: usize,
    pub dead: usize,
    /// Candidates that were extracted but never validated because the run was cancelled
    pub skipped: usize,
}

impl RunSummary {
    /// Number of candidates that produced an outcome
    pub fn validated(&self) -> usize {
        self.alive + self.dead
    }

    fn record(&mut self, outcome: &ValidationOutcome) {
        if outcome.alive {
            self.alive += 1;
        } else {
            self.dead += 1;
        }
    }
}

/// Orchestrates one harvesting run over a source catalog
pub struct Pipeline {
    config: PipelineConfig,
    catalog: Arc<SourceCatalog>,
    crawler: ProxyCrawler,
    checker: ProxyChecker,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        catalog: Arc<SourceCatalog>,
        crawler: ProxyCrawler,
        checker: ProxyChecker,
    ) -> Self {
        Self {
            config,
            catalog,
            crawler,
            checker,
        }
    }

    /// Run the pipeline to completion, writing every outcome to `report`.
    ///
    /// Setting `cancel` to `true` stops fetches in progress and stops
    /// dispatching new validations. Validations already running finish
    /// within their timeout and are still reported.
    pub async fn run<W: AsyncWrite + Unpin>(
        &self,
        report: &mut ReportWriter<W>,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunSummary, Error> {
        info!(
            "Fetching from {} sources, validating up to {} proxies at once",
            self.catalog.len(),
            self.config.max_in_flight
        );

        let (intake_tx, intake_rx) = mpsc::channel(self.config.channel_capacity);
        let (results_tx, mut results_rx) = mpsc::channel(self.config.channel_capacity);

        let fetchers: Vec<_> = self
            .catalog
            .sources()
            .iter()
            .cloned()
            .map(|source| {
                tokio::spawn(fetch_source(
                    self.crawler.clone(),
                    source,
                    intake_tx.clone(),
                    cancel.clone(),
                ))
            })
            .collect();
        // The intake channel closes once every fetch task has dropped its sender
        drop(intake_tx);

        let limiter = Arc::new(Semaphore::new(self.config.max_in_flight));
        let dispatcher = tokio::spawn(dispatch_validations(
            self.checker.clone(),
            intake_rx,
            results_tx,
            limiter,
            cancel,
        ));

        let mut summary = RunSummary::default();
        while let Some(outcome) = results_rx.recv().await {
            if let Err(e) = report.write_outcome(&outcome).await {
                error!("Aborting run: {}", e);
                return Err(e);
            }
            summary.record(&outcome);
        }
        report.finish().await?;

        for fetched in join_all(fetchers).await {
            match fetched {
                Ok(true) => summary.sources_ok += 1,
                Ok(false) => summary.sources_failed += 1,
                Err(e) => {
                    error!("Fetch task failed: {}", e);
                    summary.sources_failed += 1;
                }
            }
        }

        summary.skipped = match dispatcher.await {
            Ok(skipped) => skipped,
            Err(e) => {
                error!("Dispatch task failed: {}", e);
                0
            }
        };

        info!(
            "Run finished: {} sources ok, {} failed, {} proxies validated ({} alive, {} dead), {} skipped",
            summary.sources_ok,
            summary.sources_failed,
            summary.validated(),
            summary.alive,
            summary.dead,
            summary.skipped
        );

        Ok(summary)
    }
}

/// Fetch one source and stream its candidates onto the intake channel.
///
/// Returns whether the source was fetched successfully.
async fn fetch_source(
    crawler: ProxyCrawler,
    source: ProxySource,
    intake: mpsc::Sender<Candidate>,
    mut cancel: watch::Receiver<bool>,
) -> bool {
    let result = tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => {
            warn!("Fetch from {} cancelled", source.name);
            return false;
        }
        result = crawler.crawl_source(&source) => result,
    };

    match result.outcome {
        Ok(candidates) => {
            for candidate in candidates {
                // Fails only once the dispatcher has stopped taking candidates
                if intake.send(candidate).await.is_err() {
                    break;
                }
            }
            true
        }
        Err(e) => {
            let source_name = e.source_name().unwrap_or(&result.source);
            error!("Error fetching from {}: {}", source_name, e);
            false
        }
    }
}

/// Spawn a validation task per candidate, bounded by `limiter`.
///
/// Returns the number of candidates left unvalidated because of cancellation.
async fn dispatch_validations(
    checker: ProxyChecker,
    mut intake: mpsc::Receiver<Candidate>,
    results: mpsc::Sender<ValidationOutcome>,
    limiter: Arc<Semaphore>,
    mut cancel: watch::Receiver<bool>,
) -> usize {
    let mut skipped = 0;

    loop {
        let candidate = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => break,
            next = intake.recv() => match next {
                Some(candidate) => candidate,
                None => return 0,
            },
        };

        let permit = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                skipped += 1;
                break;
            }
            // The semaphore is never closed, so acquiring only waits for a free slot
            permit = Arc::clone(&limiter).acquire_owned() => {
                permit.expect("Semaphore closed unexpectedly")
            }
        };

        debug!("Validating {}", candidate);
        let checker = checker.clone();
        let results = results.clone();
        tokio::spawn(async move {
            let outcome = checker.validate(candidate).await;
            let _ = results.send(outcome).await;
            drop(permit);
        });
    }

    intake.close();
    while intake.recv().await.is_some() {
        skipped += 1;
    }
    warn!("Run cancelled, {} candidates were not validated", skipped);
    skipped
}

/// Resolve once the cancel flag is set. Never resolves if the sender is gone
/// without having cancelled.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
