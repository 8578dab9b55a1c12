//! Transport error types and handling.
//!
//! Covers lifecycle violations, lost connections and stream desynchronization. Recoverable
//! per-payload problems never surface here; transports drop those records themselves.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors raised by a transport
#[derive(Debug)]
pub enum TransportError {
	/// `run()` was called on a transport that already left the constructed state
	AlreadyRunning(String),
	/// The stdio transport was started without any process output attached
	NoProcessOutput(String),
	/// The endpoint could not be reached
	ConnectionError(String),
	/// An established stream was severed and could not be re-established
	ConnectionClosed(String),
	/// Framing was lost; the stream can no longer be trusted
	Desync(String),
	/// Reading from the underlying stream failed
	IoError(String),
	/// The transport cannot be built from the given settings
	ConfigurationError(String),
}

impl TransportError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::AlreadyRunning(msg) => format!("Transport already running: {}", msg),
			Self::NoProcessOutput(msg) => format!("No process output: {}", msg),
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::ConnectionClosed(msg) => format!("Connection closed: {}", msg),
			Self::Desync(msg) => format!("Stream desynchronized: {}", msg),
			Self::IoError(msg) => format!("I/O error: {}", msg),
			Self::ConfigurationError(msg) => format!("Transport configuration error: {}", msg),
		}
	}

	/// Creates a new already-running error with logging
	pub fn already_running(msg: impl Into<String>) -> Self {
		let error = Self::AlreadyRunning(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new missing-output error with logging
	pub fn no_process_output(msg: impl Into<String>) -> Self {
		let error = Self::NoProcessOutput(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new connection-closed error with logging
	pub fn connection_closed(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionClosed(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new desync error with logging
	pub fn desync(msg: impl Into<String>) -> Self {
		let error = Self::Desync(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new I/O error with logging
	pub fn io_error(msg: impl Into<String>) -> Self {
		let error = Self::IoError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new configuration error with logging
	pub fn configuration_error(msg: impl Into<String>) -> Self {
		let error = Self::ConfigurationError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for TransportError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for TransportError {}

impl From<std::io::Error> for TransportError {
	fn from(err: std::io::Error) -> Self {
		Self::io_error(err.to_string())
	}
}

impl From<reqwest::Error> for TransportError {
	fn from(err: reqwest::Error) -> Self {
		Self::connection_error(err.to_string())
	}
}
