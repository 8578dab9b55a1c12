//! Http2 transport behavior against a local HTTP server.

use serde_json::json;
use std::sync::Arc;

use fusion_indexer::services::{
	filter::MessageDecoder,
	indexer::{Indexer, IndexerError, InstallError},
	transport::{Http2Config, Http2Transport, Subscribers, Transport, TransportError},
};

use crate::integration::mocks::{
	config, hashes, payload, recording_subscribers, unused_installer, MockIndexerInstaller,
};

fn decoder() -> MessageDecoder {
	let config = config(json!({"kind": "http2"}), json!({}));
	MessageDecoder::new(&config.filters).unwrap()
}

#[tokio::test]
async fn test_stream_delivers_in_order() {
	let mut server = mockito::Server::new_async().await;
	let body = format!(
		"{}\n{}\n",
		payload("dd01", "0:1111", "5"),
		payload("dd02", "0:1111", "0")
	);
	let stream = server
		.mock("GET", "/")
		.with_status(200)
		.with_header("content-type", "application/x-ndjson")
		.with_body(body)
		.expect(1)
		.create_async()
		.await;

	let url = server.url();
	let transport = Http2Transport::new(Some(&url), decoder(), Http2Config::single_attempt()).unwrap();

	let (subscribers, seen) = recording_subscribers();
	let result = transport.run(subscribers).await;

	assert!(matches!(result, Err(TransportError::ConnectionClosed(_))));
	assert_eq!(hashes(&seen.lock().unwrap()), vec!["dd01", "dd02"]);
	stream.assert_async().await;
}

#[tokio::test]
async fn test_idle_stream_reconnects_until_budget_spent() {
	let mut server = mockito::Server::new_async().await;
	let stream = server
		.mock("GET", "/")
		.with_status(200)
		.with_body("")
		.expect(3)
		.create_async()
		.await;

	let url = server.url();
	let transport = Http2Transport::new(
		Some(&url),
		decoder(),
		Http2Config::single_attempt().with_max_reconnect_attempts(2),
	)
	.unwrap();

	let result = transport.run(Subscribers::new()).await;
	assert!(matches!(result, Err(TransportError::ConnectionClosed(_))));
	stream.assert_async().await;
}

#[tokio::test]
async fn test_remote_endpoint_skips_installation() {
	let indexer = Indexer::with_installer(
		config(json!({"kind": "http2", "listen_address": "127.0.0.1:1"}), json!({})),
		unused_installer(),
	)
	.unwrap();

	let result = indexer.run(Subscribers::new()).await;
	assert!(matches!(
		result,
		Err(IndexerError::Transport(TransportError::ConnectionError(_)))
	));
}

#[tokio::test]
async fn test_local_endpoint_requires_installation() {
	let mut installer = MockIndexerInstaller::new();
	installer
		.expect_ensure_install()
		.withf(|path| path == "/opt/fusion/indexer")
		.times(1)
		.returning(|_| Err(InstallError::MissingBinary("not downloaded".to_string())));

	let indexer =
		Indexer::with_installer(config(json!({"kind": "http2"}), json!({})), Arc::new(installer))
			.unwrap();

	let result = indexer.run(Subscribers::new()).await;
	assert!(matches!(
		result,
		Err(IndexerError::Install(InstallError::MissingBinary(_)))
	));
}
