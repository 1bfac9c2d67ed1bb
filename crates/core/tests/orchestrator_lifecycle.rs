//! Orchestrator lifecycle integration tests.
//!
//! These tests drive jobs through the orchestrator with mock collaborators:
//! queued -> initializing -> downloading -> merging -> converting -> done

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::sync::broadcast;

use vodpipe_core::{
    fetcher::{FetcherConfig, SegmentFetcher},
    testing::{fixtures, MockConverter, MockResolver, MockTransport},
    JobEvent, JobOrchestrator, JobSnapshot, JobState, OrchestratorConfig, OrchestratorError,
    Pipeline,
};

/// Test helper owning the orchestrator and its mocks.
struct TestHarness {
    orchestrator: JobOrchestrator,
    resolver: Arc<MockResolver>,
    transport: Arc<MockTransport>,
    converter: Arc<MockConverter>,
    temp_root: TempDir,
    output_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    fn with_config(config: OrchestratorConfig) -> Self {
        let resolver = Arc::new(MockResolver::new());
        let transport = Arc::new(MockTransport::new());
        let converter = Arc::new(MockConverter::new());
        let temp_root = TempDir::new().expect("Failed to create temp dir");
        let output_dir = TempDir::new().expect("Failed to create output dir");

        let fetcher = SegmentFetcher::new(
            transport.clone(),
            FetcherConfig::default()
                .with_max_parallel(4)
                .with_retry_delay(Duration::from_millis(5)),
        );
        let pipeline = Pipeline::new(
            resolver.clone(),
            fetcher,
            converter.clone(),
            temp_root.path().to_path_buf(),
        );

        Self {
            orchestrator: JobOrchestrator::new(config, pipeline),
            resolver,
            transport,
            converter,
            temp_root,
            output_dir,
        }
    }

    /// Enqueues a job whose manifest and segments are all served.
    async fn enqueue_video(&self, video_id: &str, segments: usize) -> String {
        self.resolver
            .set_manifest(video_id, "chunked", fixtures::manifest(segments, 10.0));
        fixtures::serve_segments(
            &self.transport,
            &self.resolver.playlist_url(video_id, "chunked"),
            segments,
        );
        self.orchestrator
            .enqueue(fixtures::params_in(video_id, self.output_dir.path()))
            .await
            .expect("enqueue failed")
    }

    fn output(&self, video_id: &str) -> String {
        std::fs::read_to_string(self.output_dir.path().join(format!("{}.mp4", video_id)))
            .expect("output file missing")
    }

    async fn wait_for_state(&self, id: &str, state: JobState) -> JobSnapshot {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(job) = self.orchestrator.job(id).await {
                if job.state == state {
                    return job;
                }
            }
            assert!(
                Instant::now() < deadline,
                "job {} never reached state {}",
                id,
                state
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Waits until no pipeline is registered as running.
    async fn wait_until_idle(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.orchestrator.status().await.active_count > 0 {
            assert!(Instant::now() < deadline, "orchestrator never became idle");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

fn drain(rx: &mut broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn state_changes(events: &[JobEvent], job_id: &str) -> Vec<(JobState, JobState)> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::JobStateChanged { id, from, to } if id == job_id => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_job_runs_to_completion() {
    let h = TestHarness::new();
    let mut rx = h.orchestrator.subscribe();

    let id = h.enqueue_video("vod1", 5).await;
    assert_eq!(h.orchestrator.promote_next().await.as_deref(), Some(id.as_str()));

    let job = h.wait_for_state(&id, JobState::Done).await;
    h.wait_until_idle().await;

    assert_eq!(job.progress, 100.0);
    assert!(!job.indeterminate);
    assert_eq!(job.status, "Done");
    assert!(job.log.unwrap().contains("Download task ended successfully!"));
    assert_eq!(h.output("vod1"), fixtures::expected_output(5));
    assert_eq!(h.converter.conversion_count(), 1);

    // temp dir is gone
    assert_eq!(std::fs::read_dir(h.temp_root.path()).unwrap().count(), 0);

    let events = drain(&mut rx);
    assert_eq!(events[0], JobEvent::JobAdded { id: id.clone() });
    assert_eq!(
        state_changes(&events, &id),
        vec![
            (JobState::Queued, JobState::Initializing),
            (JobState::Initializing, JobState::Downloading),
            (JobState::Downloading, JobState::Merging),
            (JobState::Merging, JobState::Converting),
            (JobState::Converting, JobState::Done),
        ]
    );
    // the list size only changes on enqueue
    let counts: Vec<&JobEvent> = events
        .iter()
        .filter(|event| matches!(event, JobEvent::DownloadsCountChanged { .. }))
        .collect();
    assert_eq!(counts, vec![&JobEvent::DownloadsCountChanged { count: 1 }]);
}

#[tokio::test]
async fn test_scheduler_loop_processes_queue_in_order() {
    let h = TestHarness::with_config(OrchestratorConfig::default().with_tick_interval_ms(10));

    let first = h.enqueue_video("first", 2).await;
    let second = h.enqueue_video("second", 3).await;

    h.orchestrator.start();

    h.wait_for_state(&first, JobState::Done).await;
    h.wait_for_state(&second, JobState::Done).await;

    let conversions = h.converter.recorded_conversions();
    assert_eq!(conversions.len(), 2);
    assert_eq!(conversions[0].job_id, first);
    assert_eq!(conversions[1].job_id, second);
    assert_eq!(h.output("second"), fixtures::expected_output(3));

    assert!(h.orchestrator.can_shutdown().await);
    h.orchestrator.stop();
}

#[tokio::test]
async fn test_single_slot_blocks_promotion() {
    let h = TestHarness::new();
    h.resolver.hold();

    let active = h.enqueue_video("active", 1).await;
    let queued_a = h.enqueue_video("queued-a", 1).await;
    let queued_b = h.enqueue_video("queued-b", 1).await;

    assert_eq!(h.orchestrator.promote_next().await.as_deref(), Some(active.as_str()));
    assert!(h.orchestrator.promote_next().await.is_none());
    assert!(h.orchestrator.promote_next().await.is_none());

    let status = h.orchestrator.status().await;
    assert_eq!(status.active_count, 1);
    assert_eq!(status.queued_count, 2);
    assert!(!h.orchestrator.can_shutdown().await);

    h.resolver.release();
    h.wait_for_state(&active, JobState::Done).await;
    h.wait_until_idle().await;

    // enqueue order decides who goes next
    assert_eq!(
        h.orchestrator.promote_next().await.as_deref(),
        Some(queued_a.as_str())
    );
    h.wait_for_state(&queued_a, JobState::Done).await;
    h.wait_until_idle().await;
    assert_eq!(
        h.orchestrator.promote_next().await.as_deref(),
        Some(queued_b.as_str())
    );
    h.wait_for_state(&queued_b, JobState::Done).await;
}

#[tokio::test]
async fn test_two_slots_run_together() {
    let h = TestHarness::with_config(OrchestratorConfig::default().with_max_active_jobs(2));
    h.resolver.hold();

    h.enqueue_video("a", 1).await;
    h.enqueue_video("b", 1).await;
    h.enqueue_video("c", 1).await;

    assert!(h.orchestrator.promote_next().await.is_some());
    assert!(h.orchestrator.promote_next().await.is_some());
    assert!(h.orchestrator.promote_next().await.is_none());
    assert_eq!(h.orchestrator.status().await.active_count, 2);

    h.resolver.release();
    h.wait_until_idle().await;
}

#[tokio::test]
async fn test_cancel_running_job_then_retry() {
    let h = TestHarness::new();
    h.resolver.hold();

    let id = h.enqueue_video("vod", 2).await;
    h.orchestrator.promote_next().await;

    h.orchestrator.cancel(&id).await.unwrap();
    let job = h.wait_for_state(&id, JobState::Canceled).await;
    h.wait_until_idle().await;

    assert!(job.log.unwrap().contains("Download task was canceled!"));
    assert_eq!(h.transport.request_count(), 0);
    assert_eq!(h.converter.conversion_count(), 0);

    h.orchestrator.retry(&id).await.unwrap();
    let job = h.orchestrator.job(&id).await.unwrap();
    assert_eq!(job.state, JobState::Queued);
    assert_eq!(job.progress, 0.0);
    assert_eq!(job.log.as_deref(), Some(""));

    h.resolver.release();
    h.orchestrator.promote_next().await;
    h.wait_for_state(&id, JobState::Done).await;
    assert_eq!(h.output("vod"), fixtures::expected_output(2));
}

#[tokio::test]
async fn test_failed_job_can_be_retried() {
    let h = TestHarness::new();
    // no manifest for this video
    let id = h
        .orchestrator
        .enqueue(fixtures::params_in("missing", h.output_dir.path()))
        .await
        .unwrap();

    h.orchestrator.promote_next().await;
    let job = h.wait_for_state(&id, JobState::Error).await;
    h.wait_until_idle().await;

    let log = job.log.unwrap();
    assert!(log.contains("Download task ended with an error!"));
    assert!(log.contains("The playlist is empty"));
    assert_eq!(job.progress, 100.0);

    h.resolver
        .set_manifest("missing", "chunked", fixtures::manifest(1, 10.0));
    fixtures::serve_segments(
        &h.transport,
        &h.resolver.playlist_url("missing", "chunked"),
        1,
    );

    h.orchestrator.retry(&id).await.unwrap();
    h.orchestrator.promote_next().await;
    h.wait_for_state(&id, JobState::Done).await;
}

#[tokio::test]
async fn test_retry_done_job_rejected() {
    let h = TestHarness::new();
    let id = h.enqueue_video("vod", 1).await;
    h.orchestrator.promote_next().await;
    h.wait_for_state(&id, JobState::Done).await;
    h.wait_until_idle().await;

    let err = h.orchestrator.retry(&id).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::InvalidState {
            state: JobState::Done,
            operation: "retry",
            ..
        }
    ));
}

#[tokio::test]
async fn test_remove_rejected_while_running() {
    let h = TestHarness::new();
    h.resolver.hold();
    let id = h.enqueue_video("vod", 1).await;
    h.orchestrator.promote_next().await;

    assert!(matches!(
        h.orchestrator.remove(&id).await,
        Err(OrchestratorError::JobActive(_))
    ));

    h.resolver.release();
    h.wait_for_state(&id, JobState::Done).await;
    h.wait_until_idle().await;

    let mut rx = h.orchestrator.subscribe();
    h.orchestrator.remove(&id).await.unwrap();
    assert!(h.orchestrator.job(&id).await.is_none());
    assert_eq!(rx.try_recv().unwrap(), JobEvent::JobRemoved { id });
}

#[tokio::test]
async fn test_remove_completed_drops_done_jobs() {
    let h = TestHarness::with_config(OrchestratorConfig::default().with_remove_completed(true));
    let mut rx = h.orchestrator.subscribe();

    let id = h.enqueue_video("vod", 1).await;
    h.orchestrator.promote_next().await;
    h.wait_until_idle().await;

    assert!(h.orchestrator.job(&id).await.is_none());
    assert!(drain(&mut rx).contains(&JobEvent::JobRemoved { id }));
    assert_eq!(h.output("vod"), fixtures::expected_output(1));
}

#[tokio::test]
async fn test_remove_completed_keeps_failed_jobs() {
    let h = TestHarness::with_config(OrchestratorConfig::default().with_remove_completed(true));
    let id = h
        .orchestrator
        .enqueue(fixtures::params_in("missing", h.output_dir.path()))
        .await
        .unwrap();

    h.orchestrator.promote_next().await;
    h.wait_for_state(&id, JobState::Error).await;
    h.wait_until_idle().await;

    assert!(h.orchestrator.job(&id).await.is_some());
}

#[tokio::test]
async fn test_shutdown_cancels_running_pipelines() {
    let h = TestHarness::new();
    h.resolver.hold();

    h.enqueue_video("running", 1).await;
    h.enqueue_video("waiting", 1).await;
    h.orchestrator.promote_next().await;

    tokio::time::timeout(Duration::from_secs(5), h.orchestrator.shutdown())
        .await
        .expect("shutdown hung");

    assert!(h.orchestrator.jobs().await.is_empty());
    assert!(h.orchestrator.can_shutdown().await);
    assert!(h.resolver.resolve_calls() <= 1);
    assert_eq!(h.converter.conversion_count(), 0);
    assert!(matches!(
        h.orchestrator.enqueue(fixtures::sample_params("late")).await,
        Err(OrchestratorError::ShutDown)
    ));
}

#[tokio::test]
async fn test_output_path_released_after_completion() {
    let h = TestHarness::new();
    let id = h.enqueue_video("vod", 1).await;
    let path = h.output_dir.path().join("vod.mp4");

    assert!(h.orchestrator.is_output_path_used(&path).await);

    h.orchestrator.promote_next().await;
    h.wait_for_state(&id, JobState::Done).await;

    assert!(!h.orchestrator.is_output_path_used(&path).await);
    assert!(!h.orchestrator.is_output_path_used(Path::new("/elsewhere.mp4")).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_retry_cycles_keep_pipeline_registered() {
    let h = TestHarness::with_config(OrchestratorConfig::default().with_max_active_jobs(2));
    h.resolver.hold();
    let id = h.enqueue_video("cycled", 1).await;
    assert_eq!(h.orchestrator.promote_next().await.as_deref(), Some(id.as_str()));

    for round in 0..50 {
        h.orchestrator.cancel(&id).await.unwrap();
        h.wait_for_state(&id, JobState::Canceled).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match h.orchestrator.retry(&id).await {
                Ok(()) => break,
                Err(OrchestratorError::JobActive(_)) => {
                    assert!(Instant::now() < deadline, "round {}: retry never accepted", round);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                Err(e) => panic!("round {}: unexpected retry error: {}", round, e),
            }
        }

        assert_eq!(
            h.orchestrator.promote_next().await.as_deref(),
            Some(id.as_str()),
            "round {}",
            round
        );
        // a late unregister of the previous run must not drop this one
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(
            h.orchestrator.status().await.active_count,
            1,
            "round {}: running pipeline lost its registration",
            round
        );
    }

    h.orchestrator.cancel(&id).await.unwrap();
    h.wait_for_state(&id, JobState::Canceled).await;
    h.wait_until_idle().await;
}
