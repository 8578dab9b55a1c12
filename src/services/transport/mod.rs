//! Message transports.
//!
//! A transport is the strategy by which decoded messages are obtained:
//! - Stdio: framed payloads on a supervised process's standard output
//! - Http2: a streaming HTTP endpoint
//! - Mock: a scripted replay for integration testing
//!
//! Every variant shares the same one-shot `Constructed → Running → Stopped` lifecycle and
//! fans decoded messages out to [`Subscribers`] in the order they were received.

mod error;
mod http2;
mod lifecycle;
mod mock;
mod stdio;
mod subscribers;

use async_trait::async_trait;
use tokio::process::Child;

pub use error::TransportError;
pub use http2::{Http2Config, Http2Transport, DEFAULT_HTTP2_ADDRESS};
pub use lifecycle::{Lifecycle, ShutdownSignal, TransportState};
pub use mock::MockTransport;
pub use stdio::{StdioTransport, MAX_FRAME_LEN};
pub use subscribers::{MessageHandler, Subscribers};

pub use crate::models::StdioFraming;

use crate::models::{Message, TransportKind};

/// Result of handing a freshly spawned process to a transport
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputOwnership {
	/// The transport consumes the process's standard output itself
	TookOwnership,
	/// The transport has no use for the output; the caller relays it
	NotApplicable,
}

/// Common capability of every transport variant
#[async_trait]
pub trait Transport: Send + Sync {
	fn kind(&self) -> TransportKind;

	/// Whether a local supervised process must be running for this transport to work
	fn requires_process(&self) -> bool;

	/// Offered the spawned process before `run()`; may take its standard output.
	fn on_process_started(&self, process: &mut Child) -> OutputOwnership;

	/// Consumes payloads and dispatches decoded messages until stopped or the source fails.
	///
	/// # Errors
	/// [`TransportError::AlreadyRunning`] on any call after the first, or the fatal error that
	/// ended the loop.
	async fn run(&self, subscribers: Subscribers) -> Result<(), TransportError>;

	/// Stops the run loop. Safe to call any number of times.
	fn stop(&self);

	fn state(&self) -> TransportState;
}

/// Dispatches unless the lifecycle has been stopped. Returns `false` once stopped.
pub(crate) fn deliver(lifecycle: &Lifecycle, subscribers: &Subscribers, message: &Message) -> bool {
	if lifecycle.is_stopped() {
		return false;
	}
	subscribers.dispatch(message);
	true
}
