//! Process-free indexer for integration tests.

use serde_json::Value;
use std::time::Duration;

use crate::{
	models::{Config, MessageFilter},
	services::{
		filter::MessageDecoder,
		indexer::IndexerError,
		transport::{MockTransport, Subscribers, Transport, TransportState},
	},
};

/// Replays scripted payloads through the decoder. Never installs or spawns anything.
pub struct TestIndexer {
	transport: MockTransport,
}

impl TestIndexer {
	/// Replays the `scan_type.filename` test data of `config` through its filters
	pub fn new(config: &Config) -> Result<Self, IndexerError> {
		let decoder = MessageDecoder::new(&config.filters)?;
		Ok(Self {
			transport: MockTransport::from_config(config, decoder)?,
		})
	}

	/// Replays an in-memory script
	pub fn from_payloads(
		filters: &[MessageFilter],
		payloads: Vec<Value>,
	) -> Result<Self, IndexerError> {
		let decoder = MessageDecoder::new(filters)?;
		Ok(Self {
			transport: MockTransport::new(payloads, decoder),
		})
	}

	pub fn with_pacing(mut self, pacing: Duration) -> Self {
		self.transport = self.transport.with_pacing(pacing);
		self
	}

	pub async fn run(&self, subscribers: Subscribers) -> Result<(), IndexerError> {
		Ok(self.transport.run(subscribers).await?)
	}

	pub fn stop(&self) {
		self.transport.stop();
	}

	pub fn state(&self) -> TransportState {
		self.transport.state()
	}
}
