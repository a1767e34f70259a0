//! Authenticated REST client for the console API
//!
//! A single exchange path carries every call: credentials and the rotating
//! anti-forgery token are attached by an explicit pre-request hook, response
//! cookies are harvested back into the session store, and JSON bodies are
//! decoded leniently (an optional-shape body that does not match is logged
//! and dropped, not escalated).

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jobforge_core::ConsoleApi;
use jobforge_domain::constants::{
    ACCEPTED_STATUS_CODES, CURRENT_USER_ENDPOINT, JOBS_ENDPOINT,
};
use jobforge_domain::{
    ChangeJobStateRequest, ConsoleConfig, CreateJobRequest, JobHandle, JobStatus, TransportError,
    TransportResult,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::session::{Credentials, SessionStore};

static API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
static XSRF_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-xsrf-token");

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One part of a multipart upload request.
pub enum MultipartEntry {
    /// Raw binary chunk, sent as `application/octet-stream`.
    Chunk(Vec<u8>),
    /// JSON-serialized entity.
    Json(serde_json::Value),
}

/// Authenticated transport for one console session.
///
/// The session store behind the mutex is the only shared mutable state:
/// written by response handling, read while building requests. One client
/// instance issues requests sequentially on one credential set; concurrent
/// jobs need separate clients.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    session: Mutex<SessionStore>,
}

impl RestClient {
    pub fn new(credentials: Credentials) -> TransportResult<Self> {
        Self::with_timeout(credentials, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(credentials: Credentials, timeout: Duration) -> TransportResult<Self> {
        url::Url::parse(credentials.base_url()).map_err(|_| {
            TransportError::Config(format!("invalid server URL: {}", credentials.base_url()))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| TransportError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: credentials.base_url().to_string(),
            session: Mutex::new(SessionStore::new(credentials)),
        })
    }

    /// Build a client from a validated [`ConsoleConfig`].
    pub fn from_config(config: &ConsoleConfig) -> TransportResult<Self> {
        config.validate()?;
        let mut credentials = Credentials::new(&config.server_url, &config.api_key);
        if let Some(username) = &config.username {
            credentials = credentials.with_username(username);
        }
        Self::with_timeout(credentials, Duration::from_secs(config.timeout_secs))
    }

    /// Validate that credentials and base URL are usable before any job
    /// work begins. Any non-accepted status fails initialization.
    pub async fn login(&self) -> TransportResult<()> {
        let _user: Option<serde_json::Value> = self.get(CURRENT_USER_ENDPOINT).await?;
        info!("login successful");
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> TransportResult<Option<T>> {
        self.exchange(Method::GET, endpoint, None::<&()>).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> TransportResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.exchange(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> TransportResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.exchange(Method::PUT, endpoint, Some(body)).await
    }

    /// Execute one call against the console.
    ///
    /// An empty or undecodable success body yields `Ok(None)`; any status
    /// outside the accepted set fails with the code and body text.
    pub async fn exchange<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> TransportResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.exchange_with_headers(method, endpoint, body, HeaderMap::new()).await
    }

    /// [`RestClient::exchange`] with caller-supplied headers. A caller
    /// pre-setting `Authorization` or the API-key header suppresses
    /// automatic credential attachment entirely.
    pub async fn exchange_with_headers<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        extra_headers: HeaderMap,
    ) -> TransportResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.join_url(endpoint);
        let mut headers = extra_headers;
        self.apply_session_headers(&mut headers)?;

        debug!(%method, endpoint, "executing call");

        let mut builder = self.http.request(method, &url).headers(headers);
        if let Some(entity) = body {
            builder = builder.json(entity);
        }

        let response =
            builder.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
        self.handle_response(response).await
    }

    /// Execute a multipart form call. One part may be a raw binary chunk,
    /// others are JSON-serialized.
    pub async fn exchange_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        parts: Vec<(String, MultipartEntry)>,
        extra_headers: HeaderMap,
    ) -> TransportResult<Option<T>> {
        let url = self.join_url(endpoint);
        let mut headers = extra_headers;
        self.apply_session_headers(&mut headers)?;

        debug!(%method, endpoint, parts = parts.len(), "executing multipart call");

        let mut form = Form::new();
        for (name, entry) in parts {
            let part = match entry {
                MultipartEntry::Chunk(bytes) => Part::bytes(bytes)
                    .file_name("filechunk")
                    .mime_str("application/octet-stream")
                    .map_err(|e| TransportError::Config(e.to_string()))?,
                MultipartEntry::Json(value) => {
                    let text = serde_json::to_string(&value)
                        .map_err(|e| TransportError::Serialize(e.to_string()))?;
                    Part::text(text)
                        .mime_str("application/json")
                        .map_err(|e| TransportError::Config(e.to_string()))?
                }
            };
            form = form.part(name, part);
        }

        let response = self
            .http
            .request(method, &url)
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        self.handle_response(response).await
    }

    /// Join a relative endpoint to the base URL with exactly one slash;
    /// absolute endpoints pass through untouched.
    fn join_url(&self, endpoint: &str) -> String {
        if endpoint.to_ascii_lowercase().starts_with("http") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Pre-request hook: attach the anti-forgery token while fresh, then
    /// exactly one of Basic auth or the API-key header — unless the caller
    /// already supplied an auth header.
    fn apply_session_headers(&self, headers: &mut HeaderMap) -> TransportResult<()> {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(token) = session.forgery_token() {
            headers.insert(
                XSRF_TOKEN_HEADER.clone(),
                HeaderValue::from_str(&token).map_err(|_| {
                    TransportError::Config("anti-forgery token is not a valid header value".into())
                })?,
            );
        }

        if headers.contains_key(AUTHORIZATION) || headers.contains_key(&API_KEY_HEADER) {
            return Ok(());
        }

        let credentials = session.credentials();
        let auth_value = match credentials.username() {
            Some(username) => {
                let encoded =
                    BASE64.encode(format!("{}:{}", username, credentials.secret()));
                (AUTHORIZATION, format!("Basic {}", encoded))
            }
            None => (API_KEY_HEADER.clone(), credentials.secret().to_string()),
        };
        headers.insert(
            auth_value.0,
            HeaderValue::from_str(&auth_value.1).map_err(|_| {
                TransportError::Config("credential is not a valid header value".into())
            })?,
        );
        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> TransportResult<Option<T>> {
        self.harvest_cookies(response.headers());

        let status = response.status().as_u16();
        if !ACCEPTED_STATUS_CODES.contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::UnexpectedStatus { status, body });
        }

        let bytes =
            response.bytes().await.map_err(|e| TransportError::Network(e.to_string()))?;
        if bytes.is_empty() {
            debug!(status, "no body in response to parse");
            return Ok(None);
        }

        match serde_json::from_slice::<T>(&bytes) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => {
                // Some endpoints legitimately answer with empty or
                // partially-shaped bodies on success.
                warn!(error = %e, "response body did not match the expected shape, dropping it");
                Ok(None)
            }
        }
    }

    /// Scan `Set-Cookie` response headers into the session store.
    fn harvest_cookies(&self, headers: &HeaderMap) {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            if let Some((name, cookie_value)) = parse_set_cookie(raw) {
                session.store_cookie(name, cookie_value);
            }
        }
    }
}

fn parse_set_cookie(raw: &str) -> Option<(&str, &str)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    Some((name.trim(), value.trim()))
}

#[async_trait]
impl ConsoleApi for RestClient {
    async fn create_job(&self, request: &CreateJobRequest) -> TransportResult<Option<JobHandle>> {
        self.post(JOBS_ENDPOINT, request).await
    }

    async fn job_status(&self, job_guid: &str) -> TransportResult<Option<JobStatus>> {
        self.get(&format!("{}/{}", JOBS_ENDPOINT, job_guid)).await
    }

    async fn change_job_state(
        &self,
        job_guid: &str,
        request: &ChangeJobStateRequest,
    ) -> TransportResult<()> {
        let _: Option<serde_json::Value> =
            self.put(&format!("{}/{}", JOBS_ENDPOINT, job_guid), request).await?;
        Ok(())
    }
}
