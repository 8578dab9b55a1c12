//! Orchestrator error types.
//!
//! `InstallError` follows the per-module error style used elsewhere in the crate; the
//! orchestrator's own `IndexerError` aggregates every failure that can end `run()`.

use log::error;
use std::{error::Error, fmt, path::PathBuf};
use thiserror::Error;

use crate::{
	models::ConfigError,
	services::{filter::FilterError, transport::TransportError},
};

/// Represents possible errors raised while making the indexer binary available
#[derive(Debug)]
pub enum InstallError {
	/// The install location does not contain the expected binary
	MissingBinary(String),
	/// The install location could not be inspected or prepared
	IoError(String),
}

impl InstallError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::MissingBinary(msg) => format!("Indexer binary missing: {}", msg),
			Self::IoError(msg) => format!("Install I/O error: {}", msg),
		}
	}

	/// Creates a new missing-binary error with logging
	pub fn missing_binary(msg: impl Into<String>) -> Self {
		let error = Self::MissingBinary(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new I/O error with logging
	pub fn io_error(msg: impl Into<String>) -> Self {
		let error = Self::IoError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for InstallError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for InstallError {}

/// Errors that end an orchestrator run
#[derive(Debug, Error)]
pub enum IndexerError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Filter(#[from] FilterError),

	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Installer failures are propagated unchanged
	#[error(transparent)]
	Install(#[from] InstallError),

	#[error("Unsupported transport type: {0}")]
	UnsupportedTransport(String),

	#[error("Failed to generate indexer config at {path}: {reason}")]
	ConfigGeneration { path: PathBuf, reason: String },

	#[error("Failed to spawn indexer {path}: {reason}")]
	Spawn { path: PathBuf, reason: String },

	#[error("Unexpected indexer termination: {0}")]
	UnexpectedTermination(String),

	#[error("Indexer already started")]
	AlreadyStarted,
}
