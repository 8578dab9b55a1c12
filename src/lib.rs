//! Fusion indexer supervisor.
//!
//! Supervises an external blockchain indexer and delivers the messages it observes to
//! subscriber callbacks, whichever way the indexer is reached:
//!
//! - Stdio: framed payloads on the standard output of a supervised subprocess
//! - Http2: a streaming HTTP endpoint, local or remote
//! - Mock: a scripted replay for integration testing
//!
//! # Modules
//! - `bootstrap`: wiring used by the binary
//! - `models`: configuration, filter and message models
//! - `services`: filtering, transports and orchestration
//! - `utils`: logging and constants

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
