//! Http2 streaming transport.
//!
//! Opens a long-lived streaming request against the indexer's HTTP endpoint and reads
//! newline-delimited JSON payloads from the response body. A severed stream is re-opened with
//! bounded exponential backoff; once the budget is spent the loop fails with
//! [`TransportError::ConnectionClosed`].

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use futures::StreamExt;
use reqwest::{header::ACCEPT, Client, Response};
use std::time::Duration;
use tokio::process::Child;
use tracing::{info, warn};

use crate::{
	models::TransportKind,
	services::{
		filter::MessageDecoder,
		transport::{
			deliver, Lifecycle, OutputOwnership, Subscribers, Transport, TransportError,
			TransportState, MAX_FRAME_LEN,
		},
	},
};

/// Endpoint used when the config does not name one
pub const DEFAULT_HTTP2_ADDRESS: &str = "127.0.0.1:3000";

/// Connection settings for the Http2 transport
#[derive(Clone, Debug)]
pub struct Http2Config {
	/// Speak HTTP/2 without upgrade negotiation
	pub prior_knowledge: bool,
	/// How long to wait for the initial connection
	pub connect_timeout: Duration,
	/// Attempts per (re)connect before giving up
	pub max_connect_attempts: usize,
	/// How many times a severed stream is re-opened before the loop fails
	pub max_reconnect_attempts: usize,
	/// First backoff delay
	pub reconnect_min_delay: Duration,
	/// Backoff ceiling
	pub reconnect_max_delay: Duration,
}

impl Default for Http2Config {
	fn default() -> Self {
		Self {
			prior_knowledge: true,
			connect_timeout: Duration::from_secs(10),
			max_connect_attempts: 3,
			max_reconnect_attempts: 5,
			reconnect_min_delay: Duration::from_millis(500),
			reconnect_max_delay: Duration::from_secs(30),
		}
	}
}

impl Http2Config {
	pub fn new() -> Self {
		Self::default()
	}

	/// Single connection attempt, no reconnects. Mostly for testing purposes
	pub fn single_attempt() -> Self {
		Self {
			prior_knowledge: false,
			connect_timeout: Duration::from_secs(1),
			max_connect_attempts: 1,
			max_reconnect_attempts: 0,
			reconnect_min_delay: Duration::from_millis(10),
			reconnect_max_delay: Duration::from_millis(10),
		}
	}

	pub fn with_prior_knowledge(mut self, prior_knowledge: bool) -> Self {
		self.prior_knowledge = prior_knowledge;
		self
	}

	pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
		self.connect_timeout = connect_timeout;
		self
	}

	pub fn with_max_connect_attempts(mut self, max_connect_attempts: usize) -> Self {
		self.max_connect_attempts = max_connect_attempts.max(1);
		self
	}

	pub fn with_max_reconnect_attempts(mut self, max_reconnect_attempts: usize) -> Self {
		self.max_reconnect_attempts = max_reconnect_attempts;
		self
	}

	pub fn with_reconnect_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
		self.reconnect_min_delay = min_delay;
		self.reconnect_max_delay = max_delay.max(min_delay);
		self
	}

	fn backoff(&self) -> ExponentialBuilder {
		ExponentialBuilder::default()
			.with_min_delay(self.reconnect_min_delay)
			.with_max_delay(self.reconnect_max_delay)
			.with_max_times(self.max_connect_attempts.saturating_sub(1))
	}
}

/// Outcome of consuming one response body
enum StreamEnd {
	/// The body ended or errored; carries the number of payloads seen
	Severed { payloads: usize, reason: String },
	/// The lifecycle was stopped while streaming
	Stopped,
}

pub struct Http2Transport {
	url: String,
	remote: bool,
	client: Client,
	decoder: MessageDecoder,
	config: Http2Config,
	lifecycle: Lifecycle,
}

impl Http2Transport {
	/// Creates the transport for `listen_address`, or the local default endpoint when absent.
	///
	/// # Errors
	/// Returns [`TransportError::ConfigurationError`] if the HTTP client cannot be built.
	pub fn new(
		listen_address: Option<&str>,
		decoder: MessageDecoder,
		config: Http2Config,
	) -> Result<Self, TransportError> {
		let address = listen_address.unwrap_or(DEFAULT_HTTP2_ADDRESS);
		let url = if address.starts_with("http://") || address.starts_with("https://") {
			address.to_string()
		} else {
			format!("http://{}", address)
		};

		let mut builder = Client::builder().connect_timeout(config.connect_timeout);
		if config.prior_knowledge {
			builder = builder.http2_prior_knowledge();
		}
		let client = builder
			.build()
			.map_err(|e| TransportError::configuration_error(e.to_string()))?;

		Ok(Self {
			url,
			remote: listen_address.is_some(),
			client,
			decoder,
			config,
			lifecycle: Lifecycle::new(),
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	async fn open_stream(&self) -> Result<Response, TransportError> {
		let response = self
			.client
			.get(&self.url)
			.header(ACCEPT, "application/x-ndjson")
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(TransportError::connection_error(format!(
				"{} answered with status {}",
				self.url,
				response.status()
			)));
		}
		Ok(response)
	}

	async fn connect(&self) -> Result<Response, TransportError> {
		(|| async { self.open_stream().await })
			.retry(self.config.backoff())
			.sleep(tokio::time::sleep)
			.notify(|err: &TransportError, delay: Duration| {
				warn!(url = %self.url, error = %err, "Stream connect failed, retrying in {:?}", delay);
			})
			.await
	}

	/// Decodes and delivers one payload. Returns `false` once the lifecycle has stopped.
	fn handle_payload(&self, line: &[u8], subscribers: &Subscribers) -> Result<bool, TransportError> {
		match self.decoder.decode(line) {
			Ok(Some(message)) => Ok(deliver(&self.lifecycle, subscribers, &message)),
			Ok(None) => Ok(true),
			Err(e) => Err(TransportError::desync(e.to_string())),
		}
	}

	async fn consume(
		&self,
		response: Response,
		subscribers: &Subscribers,
	) -> Result<StreamEnd, TransportError> {
		let mut body = response.bytes_stream();
		let mut buffer: Vec<u8> = Vec::new();
		let mut payloads = 0;

		while let Some(chunk) = body.next().await {
			let chunk = match chunk {
				Ok(chunk) => chunk,
				Err(e) => {
					return Ok(StreamEnd::Severed {
						payloads,
						reason: e.to_string(),
					})
				}
			};
			buffer.extend_from_slice(&chunk);

			while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
				let line: Vec<u8> = buffer.drain(..=pos).collect();
				let line = line.trim_ascii();
				if line.is_empty() {
					continue;
				}
				payloads += 1;
				if !self.handle_payload(line, subscribers)? {
					return Ok(StreamEnd::Stopped);
				}
			}

			if buffer.len() > MAX_FRAME_LEN {
				return Err(TransportError::desync(format!(
					"{} bytes without a newline exceeds the {} byte limit",
					buffer.len(),
					MAX_FRAME_LEN
				)));
			}
		}

		// A final record does not need a trailing newline
		let tail = buffer.trim_ascii();
		if !tail.is_empty() {
			payloads += 1;
			if !self.handle_payload(tail, subscribers)? {
				return Ok(StreamEnd::Stopped);
			}
		}

		Ok(StreamEnd::Severed {
			payloads,
			reason: "stream ended".to_string(),
		})
	}

	async fn stream_loop(&self, subscribers: &Subscribers) -> Result<(), TransportError> {
		let mut reconnects = 0;
		loop {
			let response = self.connect().await?;
			info!(url = %self.url, "Http2 stream connected");

			match self.consume(response, subscribers).await? {
				StreamEnd::Stopped => return Ok(()),
				StreamEnd::Severed { payloads, reason } => {
					if self.lifecycle.is_stopped() {
						return Ok(());
					}
					if payloads > 0 {
						reconnects = 0;
					}
					if reconnects >= self.config.max_reconnect_attempts {
						return Err(TransportError::connection_closed(format!(
							"{}: {} (after {} reconnect attempts)",
							self.url, reason, reconnects
						)));
					}
					reconnects += 1;
					warn!(url = %self.url, reason = %reason, attempt = reconnects, "Http2 stream severed, reconnecting");
					tokio::time::sleep(self.config.reconnect_min_delay).await;
				}
			}
		}
	}
}

#[async_trait]
impl Transport for Http2Transport {
	fn kind(&self) -> TransportKind {
		TransportKind::Http2
	}

	/// A local indexer is needed only when no remote endpoint was configured
	fn requires_process(&self) -> bool {
		!self.remote
	}

	fn on_process_started(&self, _process: &mut Child) -> OutputOwnership {
		OutputOwnership::NotApplicable
	}

	async fn run(&self, subscribers: Subscribers) -> Result<(), TransportError> {
		let mut shutdown = self.lifecycle.begin("Http2")?;
		info!(url = %self.url, subscribers = subscribers.len(), "Http2 transport running");

		let result = tokio::select! {
			_ = shutdown.wait() => Ok(()),
			result = self.stream_loop(&subscribers) => result,
		};

		self.lifecycle.stop();
		result
	}

	fn stop(&self) {
		if self.lifecycle.stop() {
			info!(url = %self.url, "Http2 transport stopped");
		}
	}

	fn state(&self) -> TransportState {
		self.lifecycle.state()
	}
}
