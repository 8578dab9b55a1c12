//! Filter and decoder error types.

use log::error;
use std::error::Error;
use std::fmt;

/// Errors raised while validating filters or decoding payloads
#[derive(Debug)]
pub enum FilterError {
	/// A reference string is neither an address nor a code hash
	InvalidReferenceFormat(String),
	/// A filter definition cannot be activated
	InvalidFilter(String),
	/// A payload does not have the shape of a raw message
	MalformedPayload(String),
}

impl FilterError {
	fn format_message(&self) -> String {
		match self {
			FilterError::InvalidReferenceFormat(msg) => {
				format!("Invalid reference format: {}", msg)
			}
			FilterError::InvalidFilter(msg) => format!("Invalid filter: {}", msg),
			FilterError::MalformedPayload(msg) => format!("Malformed payload: {}", msg),
		}
	}

	pub fn invalid_reference_format(msg: impl Into<String>) -> Self {
		let error = FilterError::InvalidReferenceFormat(msg.into());
		error!("{}", error.format_message());
		error
	}

	pub fn invalid_filter(msg: impl Into<String>) -> Self {
		let error = FilterError::InvalidFilter(msg.into());
		error!("{}", error.format_message());
		error
	}

	pub fn malformed_payload(msg: impl Into<String>) -> Self {
		let error = FilterError::MalformedPayload(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for FilterError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for FilterError {}

impl From<serde_json::Error> for FilterError {
	fn from(err: serde_json::Error) -> Self {
		Self::malformed_payload(err.to_string())
	}
}
