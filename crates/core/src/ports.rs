//! Console API port interface

use async_trait::async_trait;
use jobforge_domain::{
    ChangeJobStateRequest, CreateJobRequest, JobHandle, JobStatus, TransportResult,
};

/// Trait for console job operations.
///
/// Implemented by the infra transport; mocked in service tests. Methods are
/// concrete rather than a generic exchange so the trait stays object-safe.
/// Results are `Option` because the transport tolerates empty or
/// undecodable success bodies; callers decide whether absence is an error.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Create a job and return its handle.
    async fn create_job(&self, request: &CreateJobRequest) -> TransportResult<Option<JobHandle>>;

    /// Fetch a fresh status snapshot for a job.
    async fn job_status(&self, job_guid: &str) -> TransportResult<Option<JobStatus>>;

    /// Drive a server-side state change (e.g. resume a suspended job).
    async fn change_job_state(
        &self,
        job_guid: &str,
        request: &ChangeJobStateRequest,
    ) -> TransportResult<()>;
}
