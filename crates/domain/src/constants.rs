//! Wire-level constants
//!
//! Centralized location for header names, cookie names, job parameter keys
//! and step names used against the console API.

// Authentication headers
pub const API_KEY_HEADER: &str = "X-API-KEY";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

// Anti-forgery token (XSRF) exchange
pub const XSRF_TOKEN_HEADER: &str = "X-XSRF-TOKEN";
pub const XSRF_TOKEN_COOKIE: &str = "XSRF-TOKEN";
pub const XSRF_TOKEN_TTL_SECS: u64 = 300;

// Response codes treated as success by the transport
pub const ACCEPTED_STATUS_CODES: [u16; 4] = [200, 201, 202, 204];

// API endpoints
pub const JOBS_ENDPOINT: &str = "/api/jobs";
pub const CURRENT_USER_ENDPOINT: &str = "/api/user";

// Job parameter keys (wire names for the jobParameters map)
pub const PARAM_APP_GUID: &str = "appGuid";
pub const PARAM_APP_NAME: &str = "appName";
pub const PARAM_NODE_GUID: &str = "nodeGuid";
pub const PARAM_SOURCE_PATH: &str = "sourcePath";
pub const PARAM_VERSION_NAME: &str = "versionName";
pub const PARAM_VERSION_GUID: &str = "versionGuid";
pub const PARAM_RELEASE_DATE: &str = "releaseDate";
pub const PARAM_SNAPSHOT_NAME: &str = "snapshotName";
pub const PARAM_START_STEP: &str = "startStep";
pub const PARAM_END_STEP: &str = "endStep";
pub const PARAM_SECURITY_OBJECTIVE: &str = "securityObjective";
pub const PARAM_BACKUP_ENABLED: &str = "backupApplication";
pub const PARAM_BACKUP_NAME: &str = "backupName";
pub const PARAM_AUTO_DISCOVER: &str = "autoDiscover";

// Job step names reported by the console
pub const UNZIP_SOURCE_STEP: &str = "unzip_source";
pub const CODE_SCANNER_STEP: &str = "code_scanner";
pub const ACCEPTANCE_STEP: &str = "accept";
pub const ANALYZE_STEP: &str = "analyze";
pub const CONSOLIDATE_SNAPSHOT_STEP: &str = "consolidate_snapshot";
pub const UPLOAD_SNAPSHOT_STEP: &str = "upload_snapshot";

// Polling cadence
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

// Wire timestamp format for job parameters (e.g. releaseDate)
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
