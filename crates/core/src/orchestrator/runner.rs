//! Job orchestrator implementation.
//!
//! Keeps the ordered job list, promotes queued jobs into free pipeline slots
//! on every scheduler tick, and runs one pipeline task per active job.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::OrchestratorConfig;
use super::pipeline::{advance, Pipeline};
use super::types::{JobEvent, OrchestratorError, OrchestratorStatus};
use crate::job::{DownloadJob, DownloadParameters, JobSnapshot, JobState};
use crate::metrics;
use crate::progress::ProgressSink;

const EVENT_CAPACITY: usize = 256;

/// A job with a running pipeline task.
struct ActiveJob {
    /// Distinguishes successive runs of the same job id.
    run: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    /// All jobs in enqueue order.
    jobs: Vec<Arc<DownloadJob>>,
    /// Running pipelines by job id.
    active: HashMap<String, ActiveJob>,
    next_run: u64,
}

impl Registry {
    fn find(&self, id: &str) -> Option<&Arc<DownloadJob>> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    /// Drops the active entry of `id` if it still belongs to `run`.
    fn unregister(&mut self, id: &str, run: u64) -> bool {
        if self.active.get(id).is_some_and(|active| active.run == run) {
            self.active.remove(id);
            true
        } else {
            false
        }
    }

    fn output_path_used(&self, path: &Path) -> bool {
        let wanted = path.to_string_lossy().to_lowercase();
        self.jobs.iter().any(|job| {
            let state = job.state();
            (state == JobState::Queued || state.is_active())
                && job.params().full_path().to_string_lossy().to_lowercase() == wanted
        })
    }
}

struct Shared {
    config: OrchestratorConfig,
    pipeline: Pipeline,
    registry: Mutex<Registry>,
    events: broadcast::Sender<JobEvent>,
    paused: AtomicBool,
    shut_down: AtomicBool,
}

impl Shared {
    fn emit(&self, event: JobEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_count(&self, registry: &Registry) {
        self.emit(JobEvent::DownloadsCountChanged {
            count: registry.jobs.len(),
        });
    }

    fn promotion_blocked(&self) -> bool {
        self.paused.load(Ordering::SeqCst) || self.shut_down.load(Ordering::SeqCst)
    }

    /// Promotes the first queued job if a slot is free.
    async fn promote_next(self: &Arc<Self>) -> Option<String> {
        if self.promotion_blocked() {
            return None;
        }

        let mut registry = self.registry.lock().await;
        // shutdown may have drained the registry while we waited
        if self.promotion_blocked() || registry.active.len() >= self.config.max_active_jobs {
            return None;
        }

        let job = registry
            .jobs
            .iter()
            .find(|job| job.state() == JobState::Queued)
            .cloned()?;

        if let Err(e) = advance(&job, JobState::Initializing, &self.events) {
            warn!(job_id = %job.id(), error = %e, "Could not promote job");
            return None;
        }
        metrics::JOBS_STARTED.inc();
        info!(job_id = %job.id(), video_id = %job.params().video.id, "Promoted job");

        registry.next_run += 1;
        let run = registry.next_run;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::run_job(
            Arc::clone(self),
            Arc::clone(&job),
            run,
            cancel.clone(),
        ));

        let id = job.id().to_string();
        registry.active.insert(
            id.clone(),
            ActiveJob {
                run,
                cancel,
                handle,
            },
        );

        Some(id)
    }

    async fn run_job(
        shared: Arc<Self>,
        job: Arc<DownloadJob>,
        run: u64,
        cancel: CancellationToken,
    ) {
        let final_state = shared.pipeline.run(&job, &cancel, &shared.events).await;

        let mut registry = shared.registry.lock().await;
        if !registry.unregister(job.id(), run) {
            debug!(job_id = %job.id(), run, "Active entry already drained or replaced");
        }

        if final_state == JobState::Done && shared.config.remove_completed {
            let before = registry.jobs.len();
            registry.jobs.retain(|j| j.id() != job.id());
            if registry.jobs.len() != before {
                debug!(job_id = %job.id(), "Removed completed job");
                shared.emit(JobEvent::JobRemoved {
                    id: job.id().to_string(),
                });
                shared.emit_count(&registry);
            }
        }
    }
}

/// The job orchestrator: owns every download job and schedules pipelines.
pub struct JobOrchestrator {
    shared: Arc<Shared>,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobOrchestrator {
    /// Create a new orchestrator. Call [`start`](Self::start) to begin
    /// promoting queued jobs.
    pub fn new(config: OrchestratorConfig, pipeline: Pipeline) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let paused = AtomicBool::new(config.start_paused);

        Self {
            shared: Arc::new(Shared {
                config,
                pipeline,
                registry: Mutex::new(Registry::default()),
                events,
                paused,
                shut_down: AtomicBool::new(false),
            }),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.shared.config
    }

    /// Start the scheduler loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return;
        }

        info!("Starting job orchestrator");
        self.spawn_scheduler_loop();
    }

    /// Stop the scheduler loop. Running pipelines are left alone.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Orchestrator not running");
            return;
        }

        info!("Stopping job orchestrator");
        let _ = self.shutdown_tx.send(());
    }

    fn spawn_scheduler_loop(&self) {
        let running = Arc::clone(&self.running);
        let shared = Arc::clone(&self.shared);
        let tick = Duration::from_millis(shared.config.tick_interval_ms);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Scheduler loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Scheduler loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(tick) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        while shared.promote_next().await.is_some() {}
                    }
                }
            }
            info!("Scheduler loop stopped");
        });
    }

    /// Runs one scheduler step: promotes the first queued job if nothing
    /// blocks it, returning its id.
    pub async fn promote_next(&self) -> Option<String> {
        self.shared.promote_next().await
    }

    /// Adds a job to the end of the queue.
    pub async fn enqueue(&self, params: DownloadParameters) -> Result<String, OrchestratorError> {
        self.push_job(params, false).await
    }

    /// Like [`enqueue`](Self::enqueue), but refuses a job whose output file
    /// a queued or running job already writes to.
    pub async fn enqueue_exclusive(
        &self,
        params: DownloadParameters,
    ) -> Result<String, OrchestratorError> {
        self.push_job(params, true).await
    }

    async fn push_job(
        &self,
        params: DownloadParameters,
        exclusive_output: bool,
    ) -> Result<String, OrchestratorError> {
        if self.shared.shut_down.load(Ordering::SeqCst) {
            return Err(OrchestratorError::ShutDown);
        }

        let mut registry = self.shared.registry.lock().await;
        if self.shared.shut_down.load(Ordering::SeqCst) {
            return Err(OrchestratorError::ShutDown);
        }
        let output = params.full_path();
        if exclusive_output && registry.output_path_used(&output) {
            return Err(OrchestratorError::OutputPathInUse(output));
        }

        let job = Arc::new(DownloadJob::new(params));
        let id = job.id().to_string();
        registry.jobs.push(job);
        info!(job_id = %id, "Enqueued job");
        self.shared.emit(JobEvent::JobAdded { id: id.clone() });
        self.shared.emit_count(&registry);

        Ok(id)
    }

    /// Cancels a job.
    ///
    /// A queued job becomes Canceled at once. A running job has its pipeline
    /// signalled and reaches Canceled when the pipeline notices. Finished
    /// jobs are left as they are.
    pub async fn cancel(&self, id: &str) -> Result<(), OrchestratorError> {
        let registry = self.shared.registry.lock().await;
        let job = registry
            .find(id)
            .ok_or_else(|| OrchestratorError::JobNotFound(id.to_string()))?;

        match job.state() {
            JobState::Queued => {
                advance(job, JobState::Canceled, &self.shared.events).map_err(|e| {
                    OrchestratorError::InvalidState {
                        id: id.to_string(),
                        state: e.from,
                        operation: "cancel",
                    }
                })?;
                job.log("Download task was canceled!");
                info!(job_id = %id, "Canceled queued job");
            }
            state if state.is_active() => {
                if let Some(active) = registry.active.get(id) {
                    active.cancel.cancel();
                    info!(job_id = %id, "Cancellation requested");
                }
            }
            _ => {
                debug!(job_id = %id, "Cancel ignored for finished job");
            }
        }

        Ok(())
    }

    /// Puts a canceled or failed job back into the queue.
    ///
    /// Refused with [`OrchestratorError::JobActive`] until the previous
    /// pipeline task has unregistered.
    pub async fn retry(&self, id: &str) -> Result<(), OrchestratorError> {
        let registry = self.shared.registry.lock().await;
        let job = registry
            .find(id)
            .ok_or_else(|| OrchestratorError::JobNotFound(id.to_string()))?;
        if registry.active.contains_key(id) {
            return Err(OrchestratorError::JobActive(id.to_string()));
        }

        let from = job
            .reset_for_retry()
            .map_err(|e| OrchestratorError::InvalidState {
                id: id.to_string(),
                state: e.from,
                operation: "retry",
            })?;

        info!(job_id = %id, %from, "Job queued for retry");
        self.shared.emit(JobEvent::JobStateChanged {
            id: id.to_string(),
            from,
            to: JobState::Queued,
        });

        Ok(())
    }

    /// Drops a job from the list. Running jobs must be canceled first.
    pub async fn remove(&self, id: &str) -> Result<(), OrchestratorError> {
        let mut registry = self.shared.registry.lock().await;
        let position = registry
            .jobs
            .iter()
            .position(|job| job.id() == id)
            .ok_or_else(|| OrchestratorError::JobNotFound(id.to_string()))?;

        if registry.active.contains_key(id) || registry.jobs[position].state().is_active() {
            return Err(OrchestratorError::JobActive(id.to_string()));
        }

        registry.jobs.remove(position);
        info!(job_id = %id, "Removed job");
        self.shared.emit(JobEvent::JobRemoved { id: id.to_string() });
        self.shared.emit_count(&registry);

        Ok(())
    }

    /// Stops promoting queued jobs. Running pipelines continue.
    pub fn pause(&self) {
        if !self.shared.paused.swap(true, Ordering::SeqCst) {
            info!("Job promotion paused");
        }
    }

    pub fn resume(&self) {
        if self.shared.paused.swap(false, Ordering::SeqCst) {
            info!("Job promotion resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// True when nothing is queued or running.
    pub async fn can_shutdown(&self) -> bool {
        let registry = self.shared.registry.lock().await;
        registry.active.is_empty()
            && !registry
                .jobs
                .iter()
                .any(|job| job.state() == JobState::Queued)
    }

    /// Cancels everything, waits for running pipelines and clears the list.
    ///
    /// The orchestrator refuses new jobs afterwards.
    pub async fn shutdown(&self) {
        info!("Shutting down job orchestrator");
        self.shared.shut_down.store(true, Ordering::SeqCst);
        self.pause();
        self.stop();

        let handles: Vec<JoinHandle<()>> = {
            let mut registry = self.shared.registry.lock().await;
            registry
                .active
                .drain()
                .map(|(_, active)| {
                    active.cancel.cancel();
                    active.handle
                })
                .collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                debug!(error = %e, "Pipeline task ended abnormally");
            }
        }

        let mut registry = self.shared.registry.lock().await;
        for job in registry.jobs.drain(..) {
            self.shared.emit(JobEvent::JobRemoved {
                id: job.id().to_string(),
            });
        }
        registry.active.clear();
        self.shared.emit_count(&registry);

        info!("Job orchestrator shut down");
    }

    /// Summaries of all jobs in enqueue order (without logs).
    pub async fn jobs(&self) -> Vec<JobSnapshot> {
        let registry = self.shared.registry.lock().await;
        registry.jobs.iter().map(|job| job.summary()).collect()
    }

    /// Full snapshot of one job, including its log.
    pub async fn job(&self, id: &str) -> Option<JobSnapshot> {
        let registry = self.shared.registry.lock().await;
        registry.find(id).map(|job| job.snapshot())
    }

    /// Get current orchestrator status.
    pub async fn status(&self) -> OrchestratorStatus {
        let registry = self.shared.registry.lock().await;
        let count = |state: JobState| {
            registry
                .jobs
                .iter()
                .filter(|job| job.state() == state)
                .count()
        };

        OrchestratorStatus {
            running: self.running.load(Ordering::Relaxed),
            paused: self.shared.paused.load(Ordering::SeqCst),
            shut_down: self.shared.shut_down.load(Ordering::SeqCst),
            max_active_jobs: self.shared.config.max_active_jobs,
            total_jobs: registry.jobs.len(),
            queued_count: count(JobState::Queued),
            active_count: registry.active.len(),
            done_count: count(JobState::Done),
            canceled_count: count(JobState::Canceled),
            error_count: count(JobState::Error),
        }
    }

    /// Whether a queued or running job already writes to `path`.
    /// The comparison ignores case.
    pub async fn is_output_path_used(&self, path: &Path) -> bool {
        self.shared.registry.lock().await.output_path_used(path)
    }

    /// Subscribe to job list notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.shared.events.subscribe()
    }
}

impl Drop for JobOrchestrator {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetcherConfig, SegmentFetcher};
    use crate::testing::fixtures::sample_params;
    use crate::testing::{MockConverter, MockResolver, MockTransport};

    fn orchestrator(config: OrchestratorConfig) -> (JobOrchestrator, Arc<MockResolver>) {
        let resolver = Arc::new(MockResolver::new());
        let fetcher = SegmentFetcher::new(Arc::new(MockTransport::new()), FetcherConfig::default());
        let pipeline = Pipeline::new(
            resolver.clone(),
            fetcher,
            Arc::new(MockConverter::new()),
            std::env::temp_dir().join("vodpipe-runner-tests"),
        );
        (JobOrchestrator::new(config, pipeline), resolver)
    }

    #[tokio::test]
    async fn test_enqueue_and_list() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let mut rx = orch.subscribe();

        let a = orch.enqueue(sample_params("a")).await.unwrap();
        let b = orch.enqueue(sample_params("b")).await.unwrap();

        let jobs = orch.jobs().await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, a);
        assert_eq!(jobs[1].id, b);
        assert!(jobs.iter().all(|j| j.state == JobState::Queued && j.log.is_none()));

        assert_eq!(rx.try_recv().unwrap(), JobEvent::JobAdded { id: a });
        assert_eq!(
            rx.try_recv().unwrap(),
            JobEvent::DownloadsCountChanged { count: 1 }
        );
        assert_eq!(rx.try_recv().unwrap(), JobEvent::JobAdded { id: b });
        assert_eq!(
            rx.try_recv().unwrap(),
            JobEvent::DownloadsCountChanged { count: 2 }
        );
    }

    #[tokio::test]
    async fn test_remove_publishes_list_size() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let a = orch.enqueue(sample_params("a")).await.unwrap();
        orch.enqueue(sample_params("b")).await.unwrap();
        let mut rx = orch.subscribe();

        orch.cancel(&a).await.unwrap();
        orch.remove(&a).await.unwrap();

        let events: Vec<JobEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            events,
            vec![
                JobEvent::JobStateChanged {
                    id: a.clone(),
                    from: JobState::Queued,
                    to: JobState::Canceled,
                },
                JobEvent::JobRemoved { id: a },
                JobEvent::DownloadsCountChanged { count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_publishes_empty_list() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        orch.enqueue(sample_params("a")).await.unwrap();
        let mut rx = orch.subscribe();

        orch.shutdown().await;

        let events: Vec<JobEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            events.last(),
            Some(&JobEvent::DownloadsCountChanged { count: 0 })
        );
    }

    #[tokio::test]
    async fn test_retry_refused_while_previous_run_registered() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let id = orch.enqueue(sample_params("a")).await.unwrap();
        orch.cancel(&id).await.unwrap();

        // the job is Canceled but its pipeline task has not unregistered yet
        orch.shared.registry.lock().await.active.insert(
            id.clone(),
            ActiveJob {
                run: 1,
                cancel: CancellationToken::new(),
                handle: tokio::spawn(async {}),
            },
        );
        assert!(matches!(
            orch.retry(&id).await,
            Err(OrchestratorError::JobActive(_))
        ));

        orch.shared.registry.lock().await.active.clear();
        orch.retry(&id).await.unwrap();
        assert_eq!(orch.job(&id).await.unwrap().state, JobState::Queued);
    }

    #[tokio::test]
    async fn test_stale_run_keeps_newer_registration() {
        let mut registry = Registry::default();
        registry.active.insert(
            "job".to_string(),
            ActiveJob {
                run: 2,
                cancel: CancellationToken::new(),
                handle: tokio::spawn(async {}),
            },
        );

        assert!(!registry.unregister("job", 1));
        assert!(registry.active.contains_key("job"));

        assert!(registry.unregister("job", 2));
        assert!(registry.active.is_empty());
    }

    #[tokio::test]
    async fn test_no_promotion_after_shutdown_flag() {
        let (orch, resolver) = orchestrator(OrchestratorConfig::default());
        orch.enqueue(sample_params("a")).await.unwrap();

        // shutdown flagged while a scheduler step waits for the registry
        let registry = orch.shared.registry.lock().await;
        let step = {
            let shared = Arc::clone(&orch.shared);
            tokio::spawn(async move { shared.promote_next().await })
        };
        tokio::task::yield_now().await;
        orch.shared.shut_down.store(true, Ordering::SeqCst);
        drop(registry);

        assert_eq!(step.await.unwrap(), None);
        assert_eq!(orch.status().await.active_count, 0);
        assert_eq!(resolver.resolve_calls(), 0);
    }

    #[tokio::test]
    async fn test_enqueue_exclusive_rejects_used_output() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let id = orch.enqueue_exclusive(sample_params("a")).await.unwrap();

        let mut same_file = sample_params("other");
        same_file.filename = "A.MP4".to_string();
        let err = orch.enqueue_exclusive(same_file.clone()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::OutputPathInUse(_)));
        assert!(err.to_string().contains("already in use"));
        assert_eq!(orch.jobs().await.len(), 1);

        // a canceled job no longer holds its output
        orch.cancel(&id).await.unwrap();
        orch.enqueue_exclusive(same_file).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_queued_job_skips_collaborators() {
        let (orch, resolver) = orchestrator(OrchestratorConfig::default());
        let id = orch.enqueue(sample_params("a")).await.unwrap();

        orch.cancel(&id).await.unwrap();

        let job = orch.job(&id).await.unwrap();
        assert_eq!(job.state, JobState::Canceled);
        assert_eq!(job.status, "Canceled");
        assert_eq!(resolver.resolve_calls(), 0);

        // canceled jobs are not promoted
        assert!(orch.promote_next().await.is_none());
        // second cancel is a no-op
        orch.cancel(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        assert!(matches!(
            orch.cancel("nope").await,
            Err(OrchestratorError::JobNotFound(_))
        ));
        assert!(matches!(
            orch.retry("nope").await,
            Err(OrchestratorError::JobNotFound(_))
        ));
        assert!(matches!(
            orch.remove("nope").await,
            Err(OrchestratorError::JobNotFound(_))
        ));
        assert!(orch.job("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_retry_queued_job_rejected() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let id = orch.enqueue(sample_params("a")).await.unwrap();

        let err = orch.retry(&id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("cannot retry job {} in state Queued", id));
    }

    #[tokio::test]
    async fn test_retry_canceled_job() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let id = orch.enqueue(sample_params("a")).await.unwrap();
        orch.cancel(&id).await.unwrap();

        orch.retry(&id).await.unwrap();

        let job = orch.job(&id).await.unwrap();
        assert_eq!(job.state, JobState::Queued);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.log.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_paused_orchestrator_promotes_nothing() {
        let (orch, _) = orchestrator(OrchestratorConfig {
            start_paused: true,
            ..Default::default()
        });
        assert!(orch.is_paused());
        orch.enqueue(sample_params("a")).await.unwrap();

        assert!(orch.promote_next().await.is_none());
        assert!(!orch.can_shutdown().await);

        orch.resume();
        assert!(!orch.is_paused());
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_rejected() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        orch.enqueue(sample_params("a")).await.unwrap();

        orch.shutdown().await;

        assert!(orch.jobs().await.is_empty());
        assert!(orch.can_shutdown().await);
        assert!(matches!(
            orch.enqueue(sample_params("b")).await,
            Err(OrchestratorError::ShutDown)
        ));
        let status = orch.status().await;
        assert!(status.shut_down);
        assert!(status.paused);
    }

    #[tokio::test]
    async fn test_output_path_in_use() {
        let (orch, _) = orchestrator(OrchestratorConfig::default());
        let id = orch.enqueue(sample_params("a")).await.unwrap();

        assert!(orch.is_output_path_used(Path::new("/videos/a.mp4")).await);
        assert!(orch.is_output_path_used(Path::new("/VIDEOS/A.MP4")).await);
        assert!(!orch.is_output_path_used(Path::new("/videos/b.mp4")).await);

        orch.cancel(&id).await.unwrap();
        assert!(!orch.is_output_path_used(Path::new("/videos/a.mp4")).await);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let (orch, _) = orchestrator(OrchestratorConfig::default().with_max_active_jobs(2));
        orch.enqueue(sample_params("a")).await.unwrap();
        let b = orch.enqueue(sample_params("b")).await.unwrap();
        orch.cancel(&b).await.unwrap();

        let status = orch.status().await;
        assert_eq!(status.total_jobs, 2);
        assert_eq!(status.queued_count, 1);
        assert_eq!(status.canceled_count, 1);
        assert_eq!(status.active_count, 0);
        assert_eq!(status.max_active_jobs, 2);
        assert!(!status.running);
    }
}
