//! Session state for one console login
//!
//! Pure data plus an expiry check; no I/O. The transport mutates the token
//! from its response handling and reads it while building requests. One
//! session serves one credential set sequentially; concurrent jobs need
//! their own sessions.

use std::time::{Duration, Instant};

use jobforge_domain::constants::{XSRF_TOKEN_COOKIE, XSRF_TOKEN_TTL_SECS};

/// Base URL plus secret for one session. Immutable once the session begins.
#[derive(Debug, Clone)]
pub struct Credentials {
    base_url: String,
    secret: String,
    username: Option<String>,
}

impl Credentials {
    /// Build credentials with a normalized base URL: a missing scheme
    /// defaults to `http://`, a trailing slash is trimmed.
    pub fn new(server_url: impl Into<String>, secret: impl Into<String>) -> Self {
        let mut base_url = server_url.into();
        if !base_url.to_ascii_lowercase().starts_with("http") {
            base_url = format!("http://{}", base_url);
        }
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, secret: secret.into(), username: None }
    }

    /// Switch authentication from API key to HTTP Basic.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Holds the current anti-forgery token and its freshness window.
///
/// The 5-minute TTL is measured from the moment the token was last
/// considered possibly stale — the window restarts every time a request
/// goes out without a fresh token, not when the server issued one.
#[derive(Debug)]
pub struct SessionStore {
    credentials: Credentials,
    token: Option<String>,
    window_deadline: Option<Instant>,
}

impl SessionStore {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials, token: None, window_deadline: None }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Record a cookie set on a response. Only the anti-forgery cookie is
    /// retained; the name match is case-insensitive and a newly received
    /// value fully replaces the previous one.
    pub fn store_cookie(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case(XSRF_TOKEN_COOKIE) {
            self.token = Some(value.to_string());
        }
    }

    /// Token value to attach to the next request, if one is held and fresh.
    pub fn forgery_token(&mut self) -> Option<String> {
        self.forgery_token_at(Instant::now())
    }

    /// Clock-injectable variant of [`SessionStore::forgery_token`].
    ///
    /// Once the window has elapsed the held token is dropped — an expired
    /// token must never be sent — and the window restarts so the server can
    /// set a fresh one on the next exchange.
    pub fn forgery_token_at(&mut self, now: Instant) -> Option<String> {
        match (&self.token, self.window_deadline) {
            (Some(token), Some(deadline)) if now < deadline => Some(token.clone()),
            _ => {
                self.token = None;
                self.window_deadline =
                    Some(now + Duration::from_secs(XSRF_TOKEN_TTL_SECS));
                None
            }
        }
    }
}
