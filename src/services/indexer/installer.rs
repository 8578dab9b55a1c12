//! Installer collaborator.
//!
//! Guarantees a runnable indexer binary exists before the orchestrator spawns it.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::{services::indexer::InstallError, utils::constants::INDEXER_BINARY_NAME};

/// Where the indexer lives once installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
	/// Root of the installation; the generated config goes under `<full_path>/data`
	pub full_path: PathBuf,
	/// Absolute path of the executable
	pub exec_full_path: PathBuf,
}

impl InstallPaths {
	pub fn data_dir(&self) -> PathBuf {
		self.full_path.join("data")
	}
}

/// Makes the indexer binary available under an install path
#[cfg_attr(test, mockall::automock)]
pub trait Installer: Send + Sync {
	/// Ensures a runnable binary exists under `install_path`.
	///
	/// # Errors
	/// Any failure is fatal to the orchestrator and propagated unchanged.
	fn ensure_install(&self, install_path: &str) -> Result<InstallPaths, InstallError>;
}

/// Installer for binaries that are already unpacked on disk.
///
/// Verifies `<install_path>/<binary_name>` is a file. Fetching releases is left to the
/// deployment.
#[derive(Debug, Clone)]
pub struct LocalInstaller {
	binary_name: String,
}

impl Default for LocalInstaller {
	fn default() -> Self {
		Self {
			binary_name: INDEXER_BINARY_NAME.to_string(),
		}
	}
}

impl LocalInstaller {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_binary_name(binary_name: impl Into<String>) -> Self {
		Self {
			binary_name: binary_name.into(),
		}
	}
}

impl Installer for LocalInstaller {
	fn ensure_install(&self, install_path: &str) -> Result<InstallPaths, InstallError> {
		let full_path = absolute(Path::new(install_path))?;
		let exec_full_path = full_path.join(&self.binary_name);

		if !exec_full_path.is_file() {
			return Err(InstallError::missing_binary(format!(
				"{} is not a file",
				exec_full_path.display()
			)));
		}

		info!(path = %exec_full_path.display(), "Indexer binary present");
		Ok(InstallPaths {
			full_path,
			exec_full_path,
		})
	}
}

fn absolute(path: &Path) -> Result<PathBuf, InstallError> {
	if path.is_absolute() {
		return Ok(path.to_path_buf());
	}
	std::env::current_dir()
		.map(|cwd| cwd.join(path))
		.map_err(|e| InstallError::io_error(format!("failed to resolve current directory: {}", e)))
}
