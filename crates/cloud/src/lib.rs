//! Cloud API HTTP client.
//!
//! Thin async wrapper over `reqwest` that attaches the bearer token and
//! turns non-2xx replies into errors. Retries and token refresh are not
//! handled here.

pub mod client;

pub use client::{Client, Error, Response};
