//! HTTP networking module
//!
//! Provides the HTTP client used by remote table sources.

mod client;

pub use client::{HttpClient, HttpResponse};
