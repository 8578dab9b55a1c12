//! Mock transport.
//!
//! Replays a fixed sequence of payloads through the decoder without any process or network
//! endpoint. Used for integration testing.

use async_trait::async_trait;
use serde_json::Value;
use std::{path::Path, time::Duration};
use tokio::process::Child;
use tracing::{info, warn};

use crate::{
	models::{Config, ScanKind, TransportKind},
	services::{
		filter::MessageDecoder,
		transport::{
			deliver, Lifecycle, OutputOwnership, Subscribers, Transport, TransportError,
			TransportState,
		},
	},
};

pub struct MockTransport {
	payloads: Vec<Value>,
	decoder: MessageDecoder,
	pacing: Option<Duration>,
	lifecycle: Lifecycle,
}

impl MockTransport {
	pub fn new(payloads: Vec<Value>, decoder: MessageDecoder) -> Self {
		Self {
			payloads,
			decoder,
			pacing: None,
			lifecycle: Lifecycle::new(),
		}
	}

	/// Builds the replay script from `scan_type.filename`.
	///
	/// # Errors
	/// Returns [`TransportError::ConfigurationError`] when the scan type is not a test replay
	/// or the file is not a JSON array.
	pub fn from_config(config: &Config, decoder: MessageDecoder) -> Result<Self, TransportError> {
		if config.scan_type.kind != ScanKind::Test {
			return Err(TransportError::configuration_error(format!(
				"mock transport replays test data only, scan type is {:?}",
				config.scan_type.kind
			)));
		}
		let payloads = load_script(Path::new(&config.scan_type.filename))?;
		Ok(Self::new(payloads, decoder))
	}

	/// Waits `pacing` before each delivery instead of replaying instantly
	pub fn with_pacing(mut self, pacing: Duration) -> Self {
		self.pacing = Some(pacing);
		self
	}

	pub fn len(&self) -> usize {
		self.payloads.len()
	}

	pub fn is_empty(&self) -> bool {
		self.payloads.is_empty()
	}

	async fn replay(&self, subscribers: &Subscribers) {
		for (index, payload) in self.payloads.iter().enumerate() {
			if let Some(pacing) = self.pacing {
				tokio::time::sleep(pacing).await;
			}
			match self.decoder.decode_value(payload.clone()) {
				Ok(Some(message)) => {
					if !deliver(&self.lifecycle, subscribers, &message) {
						return;
					}
				}
				Ok(None) => {}
				Err(e) => warn!(index, error = %e, "Skipping malformed scripted record"),
			}
		}
		info!(payloads = self.payloads.len(), "Mock script finished");
	}
}

fn load_script(path: &Path) -> Result<Vec<Value>, TransportError> {
	let content = std::fs::read_to_string(path).map_err(|e| {
		TransportError::configuration_error(format!(
			"failed to read test data {}: {}",
			path.display(),
			e
		))
	})?;
	serde_json::from_str::<Vec<Value>>(&content).map_err(|e| {
		TransportError::configuration_error(format!(
			"test data {} is not a JSON array: {}",
			path.display(),
			e
		))
	})
}

#[async_trait]
impl Transport for MockTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Mock
	}

	fn requires_process(&self) -> bool {
		false
	}

	fn on_process_started(&self, _process: &mut Child) -> OutputOwnership {
		OutputOwnership::NotApplicable
	}

	async fn run(&self, subscribers: Subscribers) -> Result<(), TransportError> {
		let mut shutdown = self.lifecycle.begin("Mock")?;
		info!(payloads = self.payloads.len(), subscribers = subscribers.len(), "Mock transport running");

		tokio::select! {
			_ = shutdown.wait() => {},
			_ = self.replay(&subscribers) => {},
		}

		self.lifecycle.stop();
		Ok(())
	}

	fn stop(&self) {
		if self.lifecycle.stop() {
			info!("Mock transport stopped");
		}
	}

	fn state(&self) -> TransportState {
		self.lifecycle.state()
	}
}
