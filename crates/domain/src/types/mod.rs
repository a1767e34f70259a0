//! Domain data types

pub mod jobs;

pub use jobs::*;
