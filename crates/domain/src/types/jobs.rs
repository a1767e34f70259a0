//! Job lifecycle types
//!
//! A job is a unit of asynchronous work (version creation, analysis,
//! delivery) executed by the console and tracked by a server-issued GUID.
//! The client builds a typed [`JobRequest`] once, submits it exactly once,
//! and afterwards only observes read-only [`JobStatus`] snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;

/// Kind of work the console should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    AddVersion,
    CloneVersion,
    Analyze,
    CreateApplication,
    DeliverVersion,
}

impl JobType {
    /// Whether this job type delivers a new version and therefore needs a
    /// source path and version name.
    pub fn creates_version(&self) -> bool {
        matches!(self, JobType::AddVersion | JobType::CloneVersion)
    }
}

/// Server-side job state. The client never drives transitions, it only
/// observes them: NOT_STARTED → STARTING → STARTED → terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    NotStarted,
    Starting,
    Started,
    Completed,
    Failed,
    Canceled,
}

impl JobState {
    /// COMPLETED, FAILED and CANCELED admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Canceled)
    }
}

/// Typed job request with named optional fields.
///
/// The string-keyed parameter map the console expects is produced only at
/// the submission boundary via [`JobRequest::to_wire`]; this struct is the
/// source of truth internally. Built once through [`JobRequestBuilder`],
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_type: JobType,
    pub app_guid: Option<String>,
    pub app_name: Option<String>,
    pub node_guid: Option<String>,
    pub source_path: Option<String>,
    pub version_name: Option<String>,
    pub version_guid: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub snapshot_name: Option<String>,
    pub start_step: Option<String>,
    pub end_step: Option<String>,
    pub security_objective: bool,
    pub backup_enabled: bool,
    pub backup_name: Option<String>,
    pub auto_discover: bool,
}

impl JobRequest {
    pub fn builder(job_type: JobType) -> JobRequestBuilder {
        JobRequestBuilder::new(job_type)
    }

    /// Serialize into the console's job-creation shape.
    ///
    /// Only fields that are actually set make it into the parameter map;
    /// boolean flags are carried as `"true"` when enabled.
    pub fn to_wire(&self) -> CreateJobRequest {
        let mut params = BTreeMap::new();

        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                params.insert(key.to_string(), v.clone());
            }
        };

        put(constants::PARAM_APP_GUID, &self.app_guid);
        put(constants::PARAM_APP_NAME, &self.app_name);
        put(constants::PARAM_NODE_GUID, &self.node_guid);
        put(constants::PARAM_SOURCE_PATH, &self.source_path);
        put(constants::PARAM_VERSION_NAME, &self.version_name);
        put(constants::PARAM_VERSION_GUID, &self.version_guid);
        put(constants::PARAM_SNAPSHOT_NAME, &self.snapshot_name);
        put(constants::PARAM_START_STEP, &self.start_step);
        put(constants::PARAM_END_STEP, &self.end_step);
        put(constants::PARAM_BACKUP_NAME, &self.backup_name);

        if let Some(date) = self.release_date {
            params.insert(
                constants::PARAM_RELEASE_DATE.to_string(),
                date.format(constants::RELEASE_DATE_FORMAT).to_string(),
            );
        }
        if self.security_objective {
            params.insert(constants::PARAM_SECURITY_OBJECTIVE.to_string(), "true".to_string());
        }
        if self.backup_enabled {
            params.insert(constants::PARAM_BACKUP_ENABLED.to_string(), "true".to_string());
        }
        if self.auto_discover {
            params.insert(constants::PARAM_AUTO_DISCOVER.to_string(), "true".to_string());
        }

        CreateJobRequest { job_type: self.job_type, job_parameters: params }
    }
}

/// Fluent builder for [`JobRequest`].
#[derive(Debug)]
pub struct JobRequestBuilder {
    request: JobRequest,
}

impl JobRequestBuilder {
    pub fn new(job_type: JobType) -> Self {
        Self {
            request: JobRequest {
                job_type,
                app_guid: None,
                app_name: None,
                node_guid: None,
                source_path: None,
                version_name: None,
                version_guid: None,
                release_date: None,
                snapshot_name: None,
                start_step: None,
                end_step: None,
                security_objective: false,
                backup_enabled: false,
                backup_name: None,
                auto_discover: false,
            },
        }
    }

    pub fn app_guid(mut self, guid: impl Into<String>) -> Self {
        self.request.app_guid = Some(guid.into());
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.request.app_name = Some(name.into());
        self
    }

    pub fn node_guid(mut self, guid: impl Into<String>) -> Self {
        self.request.node_guid = Some(guid.into());
        self
    }

    pub fn source_path(mut self, path: impl Into<String>) -> Self {
        self.request.source_path = Some(path.into());
        self
    }

    pub fn version_name(mut self, name: impl Into<String>) -> Self {
        self.request.version_name = Some(name.into());
        self
    }

    pub fn version_guid(mut self, guid: impl Into<String>) -> Self {
        self.request.version_guid = Some(guid.into());
        self
    }

    pub fn release_date(mut self, date: DateTime<Utc>) -> Self {
        self.request.release_date = Some(date);
        self
    }

    pub fn snapshot_name(mut self, name: impl Into<String>) -> Self {
        self.request.snapshot_name = Some(name.into());
        self
    }

    pub fn start_step(mut self, step: impl Into<String>) -> Self {
        self.request.start_step = Some(step.into());
        self
    }

    pub fn end_step(mut self, step: impl Into<String>) -> Self {
        self.request.end_step = Some(step.into());
        self
    }

    pub fn security_objective(mut self, enabled: bool) -> Self {
        self.request.security_objective = enabled;
        self
    }

    pub fn backup(mut self, enabled: bool) -> Self {
        self.request.backup_enabled = enabled;
        self
    }

    pub fn backup_name(mut self, name: impl Into<String>) -> Self {
        self.request.backup_name = Some(name.into());
        self
    }

    pub fn auto_discover(mut self, enabled: bool) -> Self {
        self.request.auto_discover = enabled;
        self
    }

    pub fn build(self) -> JobRequest {
        self.request
    }
}

/// Wire shape for `POST /api/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub job_type: JobType,
    pub job_parameters: BTreeMap<String, String>,
}

/// Returned by job creation; the only input the poller needs afterwards.
///
/// Valid only for the session that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_guid: String,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub app_guid: Option<String>,
}

impl JobHandle {
    /// Status endpoint for this job, preferring the server-supplied URL.
    pub fn status_endpoint(&self) -> String {
        match &self.job_url {
            Some(url) => url.clone(),
            None => format!("{}/{}", constants::JOBS_ENDPOINT, self.job_guid),
        }
    }
}

/// Read-only snapshot of a job's progress. Always a fresh read; never
/// cached across polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: JobState,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub failure_step: Option<String>,
    #[serde(default)]
    pub step_states: BTreeMap<String, JobState>,
    #[serde(default)]
    pub app_guid: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

/// Wire shape for `PUT /api/jobs/{guid}` used to resume a suspended job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeJobStateRequest {
    pub state: JobState,
}
