//! Authenticated HTTP transport for the console API

pub mod client;
pub mod session;

pub use client::{MultipartEntry, RestClient};
pub use session::{Credentials, SessionStore};
