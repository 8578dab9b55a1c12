//! Loading and validation of the indexer config document.

use std::path::{Path, PathBuf};

use crate::{
	models::{config::error::ConfigError, Config, ConfigLoader, ScanKind},
	services::filter::validate_filters,
};

/// File name of the indexer config, resolved against the working directory
pub const CONFIG_FILE_NAME: &str = "fusion.json";

impl ConfigLoader for Config {
	fn default_path() -> PathBuf {
		std::env::current_dir()
			.unwrap_or_else(|_| PathBuf::from("."))
			.join(CONFIG_FILE_NAME)
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !path.exists() {
			return Err(ConfigError::config_not_found(format!(
				"File {} does not exist",
				path.display()
			)));
		}

		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(format!(
				"{} is not a JSON file",
				path.display()
			)));
		}

		let file = std::fs::File::open(path)?;
		let config: Config = serde_json::from_reader(file)?;

		// Validate the config after loading
		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		if self.install_path.trim().is_empty() {
			return Err("install_path must not be empty".to_string());
		}

		if let Some(address) = &self.transport.listen_address {
			if address.trim().is_empty() {
				return Err("transport.listen_address must not be empty when set".to_string());
			}
		}

		if self.scan_type.kind == ScanKind::Test && self.scan_type.filename.trim().is_empty() {
			return Err("scan_type.filename is required for test scans".to_string());
		}

		for source in &self.data_sources {
			if source.handlers.is_empty() {
				return Err(format!(
					"Data source '{}' must declare at least one handler",
					source.src.value
				));
			}
		}

		// Sender/receiver references are resolved here so that a bad filter fails at load time
		validate_filters(&self.filters).map_err(|e| e.to_string())?;

		Ok(())
	}
}
