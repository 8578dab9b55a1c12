//! Mocks and fixtures shared by the integration tests.

use mockall::mock;
use serde_json::{json, Value};
use std::{
	path::Path,
	sync::{Arc, Mutex},
};

use fusion_indexer::{
	models::{Config, Message},
	services::{
		indexer::{InstallError, InstallPaths, Installer},
		transport::Subscribers,
	},
};

// Stands in for the installer so tests control where the binary "lives"
mock! {
	pub IndexerInstaller {}

	impl Installer for IndexerInstaller {
		fn ensure_install(&self, install_path: &str) -> Result<InstallPaths, InstallError>;
	}
}

/// An installer that must never be consulted
pub fn unused_installer() -> Arc<MockIndexerInstaller> {
	let mut installer = MockIndexerInstaller::new();
	installer.expect_ensure_install().times(0);
	Arc::new(installer)
}

/// An installer reporting the binary at `<dir>/indexer`
pub fn installer_for(dir: &Path) -> Arc<MockIndexerInstaller> {
	let paths = InstallPaths {
		full_path: dir.to_path_buf(),
		exec_full_path: dir.join("indexer"),
	};
	let mut installer = MockIndexerInstaller::new();
	installer
		.expect_ensure_install()
		.times(1)
		.returning(move |_| Ok(paths.clone()));
	Arc::new(installer)
}

/// A complete `fusion.json` document for `transport`, extended with `extra` top-level fields
pub fn config_document(transport: Value, extra: Value) -> Value {
	let mut document = json!({
		"install_path": "/opt/fusion/indexer",
		"rpc_config": {"listen_address": "0.0.0.0:8081", "type": "simple"},
		"metrics_settings": {"listen_address": "0.0.0.0:9100", "collection_interval_sec": 10},
		"data_sources": [],
		"transport": transport,
		"scan_type": {"kind": "FromNetwork", "filename": ""},
	});
	if let (Some(fields), Some(extra)) = (document.as_object_mut(), extra.as_object()) {
		for (key, value) in extra {
			fields.insert(key.clone(), value.clone());
		}
	}
	document
}

pub fn config(transport: Value, extra: Value) -> Config {
	serde_json::from_value(config_document(transport, extra)).unwrap()
}

/// A raw indexer payload
pub fn payload(hash: &str, sender: &str, value: &str) -> Value {
	json!({
		"message_hash": hash,
		"message_type": "internal_inbound",
		"block_id": "block-1",
		"transaction_id": format!("tx-{}", hash),
		"transaction_timestamp": 1_700_000_000u64,
		"sender": sender,
		"receiver": "0:2222",
		"value": value,
	})
}

/// Subscribers with one recording callback; returns the shared record of delivered hashes
pub fn recording_subscribers() -> (Subscribers, Arc<Mutex<Vec<Message>>>) {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = seen.clone();
	let mut subscribers = Subscribers::new();
	subscribers.subscribe(move |message: &Message| sink.lock().unwrap().push(message.clone()));
	(subscribers, seen)
}

pub fn hashes(messages: &[Message]) -> Vec<String> {
	messages.iter().map(|m| m.message_hash.clone()).collect()
}

/// Writes an executable shell script to `<dir>/indexer`
#[cfg(unix)]
pub fn write_indexer_script(dir: &Path, body: &str) {
	use std::os::unix::fs::PermissionsExt;

	let path = dir.join("indexer");
	std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
	std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
