//! Orchestrator tests against a real subprocess speaking the stdio transport.
//!
//! The supervised binary is a small shell script written into a temporary install path.

use serde_json::json;
use std::time::Duration;

use fusion_indexer::services::{
	indexer::{Indexer, IndexerError, IndexerState},
	transport::Subscribers,
};

use crate::integration::mocks::{
	config, hashes, installer_for, payload, recording_subscribers, write_indexer_script,
};

fn stdio_config() -> fusion_indexer::models::Config {
	config(
		json!({"kind": "stdio"}),
		json!({"rpc_config": {"listen_address": "127.0.0.1:7001", "type": "full"}}),
	)
}

fn emit(hash: &str) -> String {
	format!("printf '%s\\n' '{}'", payload(hash, "0:1111", "0"))
}

/// Shell lines writing `payload` as one big-endian length-prefixed frame
fn emit_frame(hash: &str) -> String {
	let body = payload(hash, "0:1111", "0").to_string();
	let header: String = (body.len() as u32)
		.to_be_bytes()
		.iter()
		.map(|byte| format!("\\{:03o}", byte))
		.collect();
	format!("printf '{}'\nprintf '%s' '{}'", header, body)
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while !condition() {
			tokio::time::sleep(Duration::from_millis(20)).await;
		}
	})
	.await
	.expect("condition not reached in time");
}

#[tokio::test]
async fn test_stdio_delivers_and_stops_cleanly() {
	let dir = tempfile::tempdir().unwrap();
	write_indexer_script(
		dir.path(),
		&format!(
			"echo 'indexer booting'\necho 'diagnostics' >&2\n{}\n{}\nexec sleep 30",
			emit("bb01"),
			emit("bb02")
		),
	);

	let indexer = std::sync::Arc::new(
		Indexer::with_installer(stdio_config(), installer_for(dir.path())).unwrap(),
	);
	let (subscribers, seen) = recording_subscribers();

	let runner = indexer.clone();
	let handle = tokio::spawn(async move { runner.run(subscribers).await });

	wait_for(|| seen.lock().unwrap().len() == 2).await;
	assert_eq!(indexer.state(), IndexerState::Running);

	indexer.stop();
	indexer.stop();

	let result = tokio::time::timeout(Duration::from_secs(5), handle)
		.await
		.expect("run should end after stop")
		.unwrap();
	assert!(result.is_ok(), "unexpected error: {:?}", result);
	assert_eq!(hashes(&seen.lock().unwrap()), vec!["bb01", "bb02"]);
	assert_eq!(indexer.state(), IndexerState::Stopped);
}

#[tokio::test]
async fn test_non_utf8_log_output_does_not_end_the_run() {
	let dir = tempfile::tempdir().unwrap();
	write_indexer_script(
		dir.path(),
		&format!(
			"printf 'indexer log \\377\\376\\n'\n{}\nexec sleep 30",
			emit("dd01")
		),
	);

	let indexer = std::sync::Arc::new(
		Indexer::with_installer(stdio_config(), installer_for(dir.path())).unwrap(),
	);
	let (subscribers, seen) = recording_subscribers();
	let runner = indexer.clone();
	let handle = tokio::spawn(async move { runner.run(subscribers).await });

	wait_for(|| seen.lock().unwrap().len() == 1).await;
	indexer.stop();

	let result = tokio::time::timeout(Duration::from_secs(5), handle)
		.await
		.expect("run should end after stop")
		.unwrap();
	assert!(result.is_ok(), "unexpected error: {:?}", result);
	assert_eq!(hashes(&seen.lock().unwrap()), vec!["dd01"]);
}

#[tokio::test]
async fn test_length_prefixed_framing_from_config() {
	let dir = tempfile::tempdir().unwrap();
	write_indexer_script(
		dir.path(),
		&format!("{}\n{}\nexec sleep 30", emit_frame("ee01"), emit_frame("ee02")),
	);

	let config = config(
		json!({"kind": "stdio", "framing": "length_prefixed"}),
		json!({}),
	);
	let indexer =
		std::sync::Arc::new(Indexer::with_installer(config, installer_for(dir.path())).unwrap());
	let (subscribers, seen) = recording_subscribers();
	let runner = indexer.clone();
	let handle = tokio::spawn(async move { runner.run(subscribers).await });

	wait_for(|| seen.lock().unwrap().len() == 2).await;
	indexer.stop();

	let result = tokio::time::timeout(Duration::from_secs(5), handle)
		.await
		.expect("run should end after stop")
		.unwrap();
	assert!(result.is_ok(), "unexpected error: {:?}", result);
	assert_eq!(hashes(&seen.lock().unwrap()), vec!["ee01", "ee02"]);
}

#[tokio::test]
async fn test_unsolicited_exit_is_unexpected_termination() {
	let dir = tempfile::tempdir().unwrap();
	write_indexer_script(dir.path(), &format!("{}\nexit 2", emit("cc01")));

	let indexer = Indexer::with_installer(stdio_config(), installer_for(dir.path())).unwrap();
	let result = tokio::time::timeout(Duration::from_secs(10), indexer.run(Subscribers::new()))
		.await
		.expect("run should end when the process exits");

	assert!(matches!(result, Err(IndexerError::UnexpectedTermination(_))));
	assert_eq!(indexer.state(), IndexerState::Stopped);
}

#[tokio::test]
async fn test_config_is_generated_before_spawn() {
	let dir = tempfile::tempdir().unwrap();
	let data_dir = dir.path().join("data");
	std::fs::create_dir_all(&data_dir).unwrap();
	std::fs::write(data_dir.join("config.yaml"), "stale: true\n").unwrap();

	// The script copies what it was pointed at, proving the file existed at spawn time
	write_indexer_script(dir.path(), "cp \"$2\" seen.yaml\nexit 0");

	let indexer = Indexer::with_installer(stdio_config(), installer_for(dir.path())).unwrap();
	let result = indexer.run(Subscribers::new()).await;
	assert!(matches!(result, Err(IndexerError::UnexpectedTermination(_))));

	let generated = std::fs::read_to_string(data_dir.join("config.yaml")).unwrap();
	assert!(!generated.contains("stale"));
	assert!(!generated.contains("install_path"));
	assert!(generated.contains("127.0.0.1:7001"));

	let seen = std::fs::read_to_string(dir.path().join("seen.yaml")).unwrap();
	assert_eq!(seen, generated);
}

#[tokio::test]
async fn test_missing_binary_is_spawn_error() {
	let dir = tempfile::tempdir().unwrap();
	let indexer = Indexer::with_installer(stdio_config(), installer_for(dir.path())).unwrap();

	let result = indexer.run(Subscribers::new()).await;
	assert!(matches!(result, Err(IndexerError::Spawn { .. })));
	assert_eq!(indexer.state(), IndexerState::Stopped);
}
