//! Configuration loading and validation.
//!
//! The indexer reads a single JSON document (`fusion.json` by default) from the working
//! directory. Loading fails fast: a missing file, a malformed document or an invalid filter
//! definition aborts startup before any process is spawned.

use std::path::{Path, PathBuf};

mod error;
mod indexer_config;

pub use error::ConfigError;

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	/// Conventional location of the document, relative to the working directory
	fn default_path() -> PathBuf;

	/// Load the document from its conventional location
	fn load_default() -> Result<Self, ConfigError> {
		Self::load_from_path(&Self::default_path())
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self) -> Result<(), String>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
