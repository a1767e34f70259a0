//! Job submission and polling
//!
//! [`JobsService`] submits a unit of work to the console and then blocks,
//! across long wall-clock durations, until the job reaches a terminal state.
//! The wait is deliberately unbounded: a long analysis must not be cut off
//! by a client-side timeout. Callers needing a bound cancel through the
//! [`CancellationToken`] input.

use std::time::Duration;

use jobforge_domain::constants::DEFAULT_POLL_INTERVAL_SECS;
use jobforge_domain::{
    ChangeJobStateRequest, JobHandle, JobRequest, JobResult, JobServiceError, JobState, JobStatus,
    JobType,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ports::ConsoleApi;

/// Drives job creation and the status polling loop through a [`ConsoleApi`].
///
/// One service instance serves one session and one in-flight job at a time;
/// run independent jobs on independent sessions.
pub struct JobsService<A> {
    api: A,
    poll_interval: Duration,
}

impl<A: ConsoleApi> JobsService<A> {
    pub fn new(api: A) -> Self {
        Self { api, poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS) }
    }

    /// Override the inter-poll delay. Shortened only in tests.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Submit a job and return its handle.
    ///
    /// Required fields are checked before any network call; a missing
    /// identifier is a caller bug surfaced as
    /// [`JobServiceError::Contract`], never retried. A job the console
    /// created suspended (`STARTING`) is resumed before the handle is
    /// returned, so the subsequent wait cannot hang on a job that was
    /// never started.
    pub async fn submit(&self, request: &JobRequest) -> JobResult<JobHandle> {
        validate(request)?;

        let wire = request.to_wire();
        debug!(job_type = ?wire.job_type, params = wire.job_parameters.len(), "creating job");

        let handle = self
            .api
            .create_job(&wire)
            .await?
            .ok_or_else(|| {
                JobServiceError::UnexpectedResponse("job creation returned no body".into())
            })?;

        info!(job_guid = %handle.job_guid, "job created");

        if let Some(status) = self.api.job_status(&handle.job_guid).await? {
            if status.state == JobState::Starting {
                debug!(job_guid = %handle.job_guid, "job created suspended, resuming");
                self.api
                    .change_job_state(
                        &handle.job_guid,
                        &ChangeJobStateRequest { state: JobState::Started },
                    )
                    .await?;
            }
        }

        Ok(handle)
    }

    /// Submit a `CREATE_APPLICATION` job for the given application name.
    pub async fn create_application(
        &self,
        app_name: &str,
        node_guid: Option<&str>,
    ) -> JobResult<JobHandle> {
        let mut builder = JobRequest::builder(JobType::CreateApplication).app_name(app_name);
        if let Some(node) = node_guid {
            builder = builder.node_guid(node);
        }
        self.submit(&builder.build()).await
    }

    /// Poll the job until it reaches a terminal state and return the final
    /// snapshot, which retains `current_step`/`failure_step` so callers can
    /// report exactly which phase broke.
    ///
    /// Each non-terminal snapshot is handed to `on_status` for interim
    /// progress reporting; its effect on the loop is nil. Any transport
    /// failure mid-wait fails the whole wait immediately — a transient blip
    /// is surfaced, not absorbed, because masking it risks waiting forever
    /// on a job that may already have finished. `cancel` interrupts both
    /// the in-flight poll and the inter-poll sleep.
    pub async fn await_completion<F>(
        &self,
        job_guid: &str,
        mut on_status: F,
        cancel: &CancellationToken,
    ) -> JobResult<JobStatus>
    where
        F: FnMut(&JobStatus),
    {
        if job_guid.trim().is_empty() {
            return Err(JobServiceError::Contract("job guid must not be empty".into()));
        }

        loop {
            let polled = tokio::select! {
                _ = cancel.cancelled() => return Err(JobServiceError::Canceled),
                result = self.api.job_status(job_guid) => result?,
            };

            let status = polled.ok_or_else(|| {
                JobServiceError::UnexpectedResponse("status poll returned no body".into())
            })?;

            if status.state.is_terminal() {
                if status.state == JobState::Completed {
                    info!(job_guid, state = ?status.state, "job finished");
                } else {
                    warn!(
                        job_guid,
                        state = ?status.state,
                        failure_step = status.failure_step.as_deref().unwrap_or("unknown"),
                        "job did not complete"
                    );
                }
                return Ok(status);
            }

            debug!(
                job_guid,
                state = ?status.state,
                current_step = status.current_step.as_deref().unwrap_or(""),
                "job still running"
            );
            on_status(&status);

            tokio::select! {
                _ = cancel.cancelled() => return Err(JobServiceError::Canceled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Contract validation applied before any network call.
fn validate(request: &JobRequest) -> JobResult<()> {
    fn present(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    if request.job_type == JobType::CreateApplication {
        if !present(&request.app_name) {
            return Err(JobServiceError::Contract(
                "application name is required to create an application".into(),
            ));
        }
        return Ok(());
    }

    if !present(&request.app_guid) {
        return Err(JobServiceError::Contract("application guid is required".into()));
    }
    if request.job_type.creates_version() {
        if !present(&request.source_path) {
            return Err(JobServiceError::Contract(
                "source path is required for version-creating jobs".into(),
            ));
        }
        if !present(&request.version_name) {
            return Err(JobServiceError::Contract(
                "version name is required for version-creating jobs".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use jobforge_domain::constants::CODE_SCANNER_STEP;
    use jobforge_domain::{CreateJobRequest, TransportError, TransportResult};

    use super::*;

    /// Scripted console API: pops pre-seeded responses per call.
    #[derive(Default)]
    struct MockConsoleApi {
        create_response: Mutex<Option<TransportResult<Option<JobHandle>>>>,
        statuses: Mutex<VecDeque<TransportResult<Option<JobStatus>>>>,
        change_response: Mutex<Option<TransportResult<()>>>,
        create_calls: AtomicUsize,
        status_calls: AtomicUsize,
        change_calls: AtomicUsize,
    }

    impl MockConsoleApi {
        fn with_handle(self, guid: &str) -> Self {
            *self.create_response.lock().unwrap() = Some(Ok(Some(JobHandle {
                job_guid: guid.to_string(),
                job_url: Some(format!("/api/jobs/{}", guid)),
                app_guid: Some("app-1".to_string()),
            })));
            self
        }

        fn push_status(&self, state: JobState) {
            self.push(Ok(Some(status_with(state, None))));
        }

        fn push(&self, response: TransportResult<Option<JobStatus>>) {
            self.statuses.lock().unwrap().push_back(response);
        }
    }

    #[async_trait]
    impl ConsoleApi for MockConsoleApi {
        async fn create_job(
            &self,
            _request: &CreateJobRequest,
        ) -> TransportResult<Option<JobHandle>> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.create_response.lock().unwrap().take().expect("create response seeded")
        }

        async fn job_status(&self, _job_guid: &str) -> TransportResult<Option<JobStatus>> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses.lock().unwrap().pop_front().expect("status response seeded")
        }

        async fn change_job_state(
            &self,
            _job_guid: &str,
            request: &ChangeJobStateRequest,
        ) -> TransportResult<()> {
            assert_eq!(request.state, JobState::Started);
            self.change_calls.fetch_add(1, Ordering::SeqCst);
            self.change_response.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }

    fn status_with(state: JobState, failure_step: Option<&str>) -> JobStatus {
        JobStatus {
            state,
            current_step: Some(CODE_SCANNER_STEP.to_string()),
            failure_step: failure_step.map(str::to_string),
            step_states: Default::default(),
            app_guid: Some("app-1".to_string()),
            job_type: Some(JobType::AddVersion),
            created: None,
            updated: None,
        }
    }

    fn add_version_request() -> JobRequest {
        JobRequest::builder(JobType::AddVersion)
            .app_guid("app-1")
            .source_path("upload/src.zip")
            .version_name("v1")
            .build()
    }

    fn fast_service(api: MockConsoleApi) -> JobsService<MockConsoleApi> {
        JobsService::new(api).with_poll_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn submit_without_app_guid_fails_before_any_network_call() {
        let api = MockConsoleApi::default();
        let service = JobsService::new(api);
        let request = JobRequest::builder(JobType::AddVersion)
            .source_path("upload/src.zip")
            .version_name("v1")
            .build();

        let err = service.submit(&request).await.unwrap_err();

        assert!(matches!(err, JobServiceError::Contract(_)));
        assert_eq!(service.api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_requires_source_path_and_version_name_for_version_jobs() {
        let service = JobsService::new(MockConsoleApi::default());

        let missing_source =
            JobRequest::builder(JobType::CloneVersion).app_guid("app-1").version_name("v1").build();
        assert!(matches!(
            service.submit(&missing_source).await.unwrap_err(),
            JobServiceError::Contract(_)
        ));

        let missing_version = JobRequest::builder(JobType::CloneVersion)
            .app_guid("app-1")
            .source_path("upload/src.zip")
            .build();
        assert!(matches!(
            service.submit(&missing_version).await.unwrap_err(),
            JobServiceError::Contract(_)
        ));
        assert_eq!(service.api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_returns_handle_without_resume_when_started() {
        let api = MockConsoleApi::default().with_handle("job-1");
        api.push_status(JobState::Started);
        let service = JobsService::new(api);

        let handle = service.submit(&add_version_request()).await.unwrap();

        assert_eq!(handle.job_guid, "job-1");
        assert_eq!(service.api.change_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_resumes_job_created_suspended() {
        let api = MockConsoleApi::default().with_handle("job-1");
        api.push_status(JobState::Starting);
        let service = JobsService::new(api);

        service.submit(&add_version_request()).await.unwrap();

        assert_eq!(service.api.change_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submit_fails_when_resume_fails() {
        let api = MockConsoleApi::default().with_handle("job-1");
        api.push_status(JobState::Starting);
        *api.change_response.lock().unwrap() =
            Some(Err(TransportError::Network("connection reset".into())));
        let service = JobsService::new(api);

        let err = service.submit(&add_version_request()).await.unwrap_err();
        assert!(matches!(err, JobServiceError::Transport(_)));
    }

    #[tokio::test]
    async fn submit_fails_when_creation_returns_no_body() {
        let api = MockConsoleApi::default();
        *api.create_response.lock().unwrap() = Some(Ok(None));
        let service = JobsService::new(api);

        let err = service.submit(&add_version_request()).await.unwrap_err();
        assert!(matches!(err, JobServiceError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn await_completion_polls_until_terminal() {
        let api = MockConsoleApi::default();
        api.push_status(JobState::Started);
        api.push_status(JobState::Started);
        api.push_status(JobState::Completed);
        let service = fast_service(api);

        let mut observed = Vec::new();
        let status = service
            .await_completion("job-1", |s| observed.push(s.state), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status.state, JobState::Completed);
        assert_eq!(service.api.status_calls.load(Ordering::SeqCst), 3);
        // Observer sees only the two non-terminal snapshots.
        assert_eq!(observed, vec![JobState::Started, JobState::Started]);
    }

    #[tokio::test]
    async fn await_completion_preserves_failure_step_on_cancel() {
        let api = MockConsoleApi::default();
        api.push_status(JobState::Started);
        api.push(Ok(Some(status_with(JobState::Canceled, Some(CODE_SCANNER_STEP)))));
        let service = fast_service(api);

        let status = service
            .await_completion("job-1", |_| {}, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status.state, JobState::Canceled);
        assert_eq!(status.failure_step.as_deref(), Some(CODE_SCANNER_STEP));
    }

    #[tokio::test]
    async fn await_completion_fails_whole_wait_on_transport_error() {
        let api = MockConsoleApi::default();
        api.push_status(JobState::Started);
        api.push(Err(TransportError::UnexpectedStatus {
            status: 500,
            body: "server error".into(),
        }));
        let service = fast_service(api);

        let err = service
            .await_completion("job-1", |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            JobServiceError::Transport(transport) => {
                assert_eq!(transport.status(), Some(500));
                assert!(transport.to_string().contains("server error"));
            }
            other => panic!("expected transport failure, got {:?}", other),
        }
        // No retry after the failed poll.
        assert_eq!(service.api.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn await_completion_rejects_empty_guid() {
        let service = JobsService::new(MockConsoleApi::default());

        let err = service
            .await_completion("  ", |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JobServiceError::Contract(_)));
        assert_eq!(service.api.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_inter_poll_sleep() {
        let api = MockConsoleApi::default();
        api.push_status(JobState::Started);
        // Long cadence: only cancellation can end the wait promptly.
        let service = JobsService::new(api).with_poll_interval(Duration::from_secs(3600));
        let cancel = CancellationToken::new();

        let canceler = cancel.clone();
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            service.await_completion("job-1", move |_| canceler.cancel(), &cancel),
        )
        .await
        .expect("cancellation should end the wait well before the poll cadence");

        assert!(matches!(result.unwrap_err(), JobServiceError::Canceled));
    }
}
