//! Ingest Orchestrator
//!
//! Drives the fixed-interval poll loop: builds fetch tasks from the endpoint
//! table, dispatches them concurrently, and writes each response's points as
//! soon as that response completes.

use std::sync::Arc;
use std::time::Duration;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{Notify, RwLock};

use crate::config::Settings;
use crate::domain::market::{build_point, records_from_body};
use crate::domain::{EndpointTable, ErrorKind, FetchTask, IngestError};
use crate::ports::{Connector, PointWriter, PriceSource};

/// Counts for one completed iteration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationSummary {
    /// Fetch tasks dispatched
    pub dispatched: usize,
    /// Responses fully converted and written
    pub fetched: usize,
    /// Points acknowledged by the database
    pub points_written: usize,
}

/// Status snapshot of the orchestrator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestratorStatus {
    pub is_running: bool,
    pub iterations: u64,
    pub failed_iterations: u64,
    pub points_written: u64,
}

/// Main poll loop that coordinates fetching and persistence
pub struct IngestOrchestrator<C: Connector> {
    settings: Arc<Settings>,
    connector: Arc<C>,
    is_running: Arc<RwLock<bool>>,
    stop_requested: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
    status: Arc<RwLock<OrchestratorStatus>>,
    poll_interval: Duration,
}

impl<C: Connector> IngestOrchestrator<C> {
    /// Create new orchestrator; the interval comes from `settings`
    pub fn new(settings: Settings, connector: C) -> Self {
        let poll_interval = settings.poll_interval;

        Self {
            settings: Arc::new(settings),
            connector: Arc::new(connector),
            is_running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
            status: Arc::new(RwLock::new(OrchestratorStatus::default())),
            poll_interval,
        }
    }

    /// Run the poll loop until [`stop`](Self::stop) is called.
    ///
    /// Iteration errors are logged and never end the loop. A stop requested
    /// before `run` is entered makes it return without iterating.
    pub async fn run(&self) {
        if *self.stop_requested.read().await {
            tracing::info!("Stop already requested, ingest loop not started");
            return;
        }
        *self.is_running.write().await = true;

        tracing::info!(
            "Starting ingest loop - {} exchanges, poll interval: {:?}",
            self.settings.endpoints.len(),
            self.poll_interval
        );

        while !*self.stop_requested.read().await {
            let outcome = self.tick().await;
            self.record(&outcome).await;

            match outcome {
                Ok(summary) => tracing::info!(
                    "Iteration complete: {} fetched, {} points written",
                    summary.fetched,
                    summary.points_written
                ),
                Err(e) => log_iteration_failure(&e),
            }

            if *self.stop_requested.read().await {
                break;
            }

            // Fixed pause, not shortened by the time the iteration took
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.notified() => {}
            }
        }

        *self.is_running.write().await = false;
        tracing::info!("Ingest loop stopped");
    }

    /// Execute one poll iteration with fresh connections
    pub async fn tick(&self) -> Result<IterationSummary, IngestError> {
        let tasks = self.settings.endpoints.fetch_tasks();
        let (source, sink) = self.connector.open()?;

        run_iteration(&tasks, &self.settings.endpoints, &source, &sink).await
    }

    /// Stop the poll loop after the current iteration. The request is
    /// one-shot: it is never cleared, so it also holds for a later `run`.
    pub async fn stop(&self) {
        *self.stop_requested.write().await = true;
        self.shutdown.notify_one();
        tracing::info!("Stop signal sent to ingest loop");
    }

    /// Get current status snapshot
    pub async fn status(&self) -> OrchestratorStatus {
        let mut status = self.status.read().await.clone();
        status.is_running = *self.is_running.read().await;
        status
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn record(&self, outcome: &Result<IterationSummary, IngestError>) {
        let mut status = self.status.write().await;
        status.iterations += 1;
        match outcome {
            Ok(summary) => status.points_written += summary.points_written as u64,
            Err(_) => status.failed_iterations += 1,
        }
    }
}

// Manual impl: `C` itself need not be Clone
impl<C: Connector> Clone for IngestOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            connector: Arc::clone(&self.connector),
            is_running: Arc::clone(&self.is_running),
            stop_requested: Arc::clone(&self.stop_requested),
            shutdown: Arc::clone(&self.shutdown),
            status: Arc::clone(&self.status),
            poll_interval: self.poll_interval,
        }
    }
}

/// Run one iteration over `tasks`.
///
/// All fetches are dispatched at once and consumed in completion order. Each
/// response is converted and written before the next completion is taken.
/// After the first error nothing more is written, but the remaining fetches
/// are still awaited; the first error is then returned.
pub async fn run_iteration<S, W>(
    tasks: &[FetchTask],
    endpoints: &EndpointTable,
    source: &S,
    sink: &W,
) -> Result<IterationSummary, IngestError>
where
    S: PriceSource + ?Sized,
    W: PointWriter + ?Sized,
{
    let mut summary = IterationSummary {
        dispatched: tasks.len(),
        ..IterationSummary::default()
    };

    let mut pending: FuturesUnordered<_> = tasks
        .iter()
        .map(|task| async move {
            let result = source.fetch(&task.url, task.api_key.as_deref()).await;
            (task, result)
        })
        .collect();

    let mut failure: Option<IngestError> = None;

    while let Some((task, result)) = pending.next().await {
        if failure.is_some() {
            if let Err(e) = result {
                tracing::debug!("Discarding failure for {} after abort: {}", task, e);
            }
            continue;
        }

        let outcome = match result {
            Ok(body) => persist_response(&body, endpoints, sink, &mut summary).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => summary.fetched += 1,
            Err(e) => {
                tracing::debug!("Aborting iteration at {}: {}", task, e);
                failure = Some(e);
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}

async fn persist_response<W: PointWriter + ?Sized>(
    body: &serde_json::Value,
    endpoints: &EndpointTable,
    sink: &W,
    summary: &mut IterationSummary,
) -> Result<(), IngestError> {
    for record in records_from_body(body)? {
        let point = build_point(&record, endpoints)?;
        sink.write_point(&point).await?;
        summary.points_written += 1;
    }
    Ok(())
}

/// Which stage of an iteration an error kind belongs to
pub fn failure_stage(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Transport => "fetch",
        ErrorKind::Lookup | ErrorKind::Parse | ErrorKind::Malformed => "build",
        ErrorKind::Persistence => "write",
    }
}

fn log_iteration_failure(err: &IngestError) {
    let stage = failure_stage(err.kind());
    tracing::error!(stage, "Iteration failed during {}: {}", stage, err);
}
