//! Generation of the indexer binary's own configuration file.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::{models::Config, services::indexer::IndexerError};

/// File name the indexer binary is pointed at with `--config`
pub const INDEXER_CONFIG_FILE: &str = "config.yaml";

/// File name the indexer binary is pointed at with `--global-config`
pub const GLOBAL_CONFIG_FILE: &str = "global.config.json";

/// Top-level keys read only by the supervisor, never forwarded to the indexer
const SUPERVISOR_ONLY_KEYS: [&str; 2] = ["install_path", "filters"];

/// Writes `config` as YAML into `data_dir`, without the supervisor-only keys.
///
/// Everything else, including keys this crate does not interpret, is forwarded as loaded.
/// An existing file is replaced wholesale. Returns the path written.
pub fn generate_indexer_config(config: &Config, data_dir: &Path) -> Result<PathBuf, IndexerError> {
	let path = data_dir.join(INDEXER_CONFIG_FILE);
	let generation_error = |reason: String| IndexerError::ConfigGeneration {
		path: path.clone(),
		reason,
	};

	let mut document = serde_json::to_value(config).map_err(|e| generation_error(e.to_string()))?;
	if let Some(fields) = document.as_object_mut() {
		for key in SUPERVISOR_ONLY_KEYS {
			fields.remove(key);
		}
	}
	let yaml = serde_yaml::to_string(&document).map_err(|e| generation_error(e.to_string()))?;

	std::fs::create_dir_all(data_dir).map_err(|e| generation_error(e.to_string()))?;
	std::fs::write(&path, yaml).map_err(|e| generation_error(e.to_string()))?;

	info!(path = %path.display(), "Indexer config generated");
	Ok(path)
}
