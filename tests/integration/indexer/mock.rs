//! End-to-end replay through the orchestrator with the mock transport.

use serde_json::json;
use std::sync::{Arc, Mutex};

use fusion_indexer::{
	models::{Message, TransportKind},
	services::{
		indexer::{Indexer, IndexerError, IndexerState, TestIndexer},
		transport::Subscribers,
	},
};

use crate::integration::mocks::{config, hashes, payload, unused_installer};

/// Three scripted payloads; only the ones sent by `0:1111` pass the filter
fn scripted_config(dir: &tempfile::TempDir) -> fusion_indexer::models::Config {
	let script = dir.path().join("messages.json");
	let payloads = vec![
		payload("aa01", "0:1111", "0"),
		payload("aa02", "0:9999", "0"),
		payload("aa03", "0:1111", "0"),
	];
	std::fs::write(&script, serde_json::to_string(&payloads).unwrap()).unwrap();

	config(
		json!({"kind": "mock"}),
		json!({
			"scan_type": {"kind": "TestJson", "filename": script.to_string_lossy()},
			"filters": [{
				"name": "from_treasury",
				"type": "any_message",
				"entries": [{"name": "treasury", "sender": "0:1111"}],
			}],
		}),
	)
}

#[tokio::test]
async fn test_mock_replay_delivers_matching_messages_in_order() {
	let dir = tempfile::tempdir().unwrap();
	let indexer = Indexer::with_installer(scripted_config(&dir), unused_installer()).unwrap();
	assert_eq!(indexer.transport_kind(), TransportKind::Mock);

	let first = Arc::new(Mutex::new(Vec::new()));
	let second = Arc::new(Mutex::new(Vec::new()));
	let mut subscribers = Subscribers::new();
	{
		let first = first.clone();
		let second = second.clone();
		subscribers
			.subscribe(move |m: &Message| first.lock().unwrap().push(m.clone()))
			.subscribe_filter("from_treasury", move |m: &Message| {
				second.lock().unwrap().push(m.clone())
			});
	}

	indexer.run(subscribers).await.unwrap();

	let first = first.lock().unwrap();
	assert_eq!(hashes(&first), vec!["aa01", "aa03"]);
	assert_eq!(hashes(&second.lock().unwrap()), vec!["aa01", "aa03"]);
	assert!(first.iter().all(|m| m.filter_name == "from_treasury"));
	assert_eq!(first[1].transaction_id, "tx-aa03");
	assert_eq!(indexer.state(), IndexerState::Stopped);
}

#[tokio::test]
async fn test_second_run_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let indexer = Indexer::with_installer(scripted_config(&dir), unused_installer()).unwrap();

	indexer.run(Subscribers::new()).await.unwrap();
	assert!(matches!(
		indexer.run(Subscribers::new()).await,
		Err(IndexerError::AlreadyStarted)
	));
}

#[tokio::test]
async fn test_stop_is_idempotent_after_completion() {
	let dir = tempfile::tempdir().unwrap();
	let indexer = Indexer::with_installer(scripted_config(&dir), unused_installer()).unwrap();

	indexer.run(Subscribers::new()).await.unwrap();
	indexer.stop();
	indexer.stop();
	assert_eq!(indexer.state(), IndexerState::Stopped);
}

#[tokio::test]
async fn test_test_indexer_replays_the_same_script() {
	let dir = tempfile::tempdir().unwrap();
	let indexer = TestIndexer::new(&scripted_config(&dir)).unwrap();

	let (subscribers, seen) = crate::integration::mocks::recording_subscribers();
	indexer.run(subscribers).await.unwrap();
	assert_eq!(hashes(&seen.lock().unwrap()), vec!["aa01", "aa03"]);
}

#[test]
fn test_unsupported_transport_never_reaches_installer() {
	let result = Indexer::with_installer(
		config(json!({"kind": "websocket"}), json!({})),
		unused_installer(),
	);
	assert!(matches!(
		result,
		Err(IndexerError::UnsupportedTransport(kind)) if kind == "websocket"
	));
}

#[test]
fn test_invalid_filter_reference_fails_construction() {
	let result = Indexer::with_installer(
		config(
			json!({"kind": "stdio"}),
			json!({"filters": [{
				"name": "broken",
				"type": "any_message",
				"entries": [{"name": "e", "receiver": "0x12"}],
			}]}),
		),
		unused_installer(),
	);
	assert!(matches!(result, Err(IndexerError::Filter(_))));
}
