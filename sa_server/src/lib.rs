//! Preconfigured session authentication server.
//!
//! Wires the `sessions_api` capabilities (record store, password verifier,
//! session signer) into an axum application with configuration, logging,
//! and metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
