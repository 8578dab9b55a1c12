//! Stdio transport.
//!
//! Consumes framed payloads from the standard output of the supervised indexer process.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::{
	io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader},
	process::Child,
};
use tracing::{debug, info, warn};

use crate::{
	models::{StdioFraming, TransportKind},
	services::{
		filter::MessageDecoder,
		transport::{
			deliver, Lifecycle, OutputOwnership, Subscribers, Transport, TransportError,
			TransportState,
		},
	},
};

/// Upper bound for a single length-prefixed frame; anything larger means framing was lost
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

pub struct StdioTransport {
	decoder: MessageDecoder,
	framing: StdioFraming,
	output: Mutex<Option<OutputStream>>,
	lifecycle: Lifecycle,
}

impl StdioTransport {
	pub fn new(decoder: MessageDecoder) -> Self {
		Self {
			decoder,
			framing: StdioFraming::default(),
			output: Mutex::new(None),
			lifecycle: Lifecycle::new(),
		}
	}

	pub fn with_framing(mut self, framing: StdioFraming) -> Self {
		self.framing = framing;
		self
	}

	/// Attaches the stream the run loop will consume. A later call replaces an earlier one.
	pub fn attach_output<R>(&self, output: R)
	where
		R: AsyncRead + Send + Unpin + 'static,
	{
		*self.output.lock().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(output));
	}

	fn take_output(&self) -> Option<OutputStream> {
		self.output.lock().unwrap_or_else(|e| e.into_inner()).take()
	}

	fn handle_line(&self, line: &[u8], subscribers: &Subscribers) {
		let line = line.trim_ascii();
		if line.is_empty() {
			return;
		}

		if !line.starts_with(b"{") {
			debug!(target: "indexer", "{}", String::from_utf8_lossy(line));
			return;
		}

		match self.decoder.decode(line) {
			Ok(Some(message)) => {
				deliver(&self.lifecycle, subscribers, &message);
			}
			Ok(None) => {}
			Err(e) => warn!(error = %e, "Skipping malformed record on indexer output"),
		}
	}

	/// Reads raw lines so that non-UTF-8 log output never ends the run
	async fn consume_lines(
		&self,
		output: OutputStream,
		subscribers: &Subscribers,
	) -> Result<(), TransportError> {
		let mut reader = BufReader::new(output);
		let mut line = Vec::new();
		loop {
			line.clear();
			if reader.read_until(b'\n', &mut line).await? == 0 {
				break;
			}
			self.handle_line(&line, subscribers);
			if self.lifecycle.is_stopped() {
				break;
			}
		}
		info!("Indexer output closed");
		Ok(())
	}

	async fn consume_frames(
		&self,
		mut output: OutputStream,
		subscribers: &Subscribers,
	) -> Result<(), TransportError> {
		loop {
			let len = match output.read_u32().await {
				Ok(len) => len as usize,
				Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
					info!("Indexer output closed");
					return Ok(());
				}
				Err(e) => return Err(e.into()),
			};

			if len > MAX_FRAME_LEN {
				return Err(TransportError::desync(format!(
					"frame of {} bytes exceeds the {} byte limit",
					len, MAX_FRAME_LEN
				)));
			}

			let mut frame = vec![0u8; len];
			output.read_exact(&mut frame).await.map_err(|e| {
				TransportError::desync(format!("truncated frame of {} bytes: {}", len, e))
			})?;

			match self.decoder.decode(&frame) {
				Ok(Some(message)) => {
					if !deliver(&self.lifecycle, subscribers, &message) {
						return Ok(());
					}
				}
				Ok(None) => {}
				Err(e) => return Err(TransportError::desync(e.to_string())),
			}
		}
	}
}

#[async_trait]
impl Transport for StdioTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Stdio
	}

	fn requires_process(&self) -> bool {
		true
	}

	fn on_process_started(&self, process: &mut Child) -> OutputOwnership {
		match process.stdout.take() {
			Some(stdout) => {
				self.attach_output(stdout);
				OutputOwnership::TookOwnership
			}
			None => {
				warn!("Indexer process has no piped stdout, nothing to consume");
				OutputOwnership::NotApplicable
			}
		}
	}

	async fn run(&self, subscribers: Subscribers) -> Result<(), TransportError> {
		let mut shutdown = self.lifecycle.begin("Stdio")?;

		let output = match self.take_output() {
			Some(output) => output,
			None => {
				self.lifecycle.stop();
				return Err(TransportError::no_process_output(
					"stdio transport started before a process output was attached",
				));
			}
		};

		info!(framing = ?self.framing, subscribers = subscribers.len(), "Stdio transport running");

		let result = tokio::select! {
			_ = shutdown.wait() => Ok(()),
			result = async {
				match self.framing {
					StdioFraming::Lines => self.consume_lines(output, &subscribers).await,
					StdioFraming::LengthPrefixed => self.consume_frames(output, &subscribers).await,
				}
			} => result,
		};

		self.lifecycle.stop();
		result
	}

	fn stop(&self) {
		if self.lifecycle.stop() {
			info!("Stdio transport stopped");
		}
	}

	fn state(&self) -> TransportState {
		self.lifecycle.state()
	}
}
