//! Indexer orchestration.
//!
//! Selects a transport from the configuration, makes sure the indexer binary is installed,
//! writes its config, spawns and supervises it, and delivers decoded messages to subscribers.

mod config_writer;
mod error;
mod installer;
mod process;
mod service;
mod test_indexer;

pub use config_writer::{generate_indexer_config, GLOBAL_CONFIG_FILE, INDEXER_CONFIG_FILE};
pub use error::{IndexerError, InstallError};
#[cfg(test)]
pub use installer::MockInstaller;
pub use installer::{InstallPaths, Installer, LocalInstaller};
pub use process::{spawn_indexer, ProcessControl, ProcessExit, SupervisedProcess};
pub use service::{create_transport, Indexer, IndexerState};
pub use test_indexer::TestIndexer;
