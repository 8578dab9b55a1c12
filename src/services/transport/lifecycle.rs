//! Shared `Constructed → Running → Stopped` state machine for transports.

use std::sync::Mutex;
use tokio::sync::watch;

use crate::services::transport::TransportError;

/// Observable transport state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
	Constructed,
	Running,
	Stopped,
}

/// One-shot lifecycle guard.
///
/// `begin` may succeed once; `stop` is idempotent and wakes every run loop waiting on the
/// shutdown receiver it handed out.
#[derive(Debug)]
pub struct Lifecycle {
	state: Mutex<TransportState>,
	shutdown: watch::Sender<bool>,
}

impl Default for Lifecycle {
	fn default() -> Self {
		Self::new()
	}
}

impl Lifecycle {
	pub fn new() -> Self {
		let (shutdown, _) = watch::channel(false);
		Self {
			state: Mutex::new(TransportState::Constructed),
			shutdown,
		}
	}

	pub fn state(&self) -> TransportState {
		*self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	pub fn is_stopped(&self) -> bool {
		self.state() == TransportState::Stopped
	}

	/// Moves `Constructed → Running` and returns the shutdown signal for the run loop.
	///
	/// # Errors
	/// Returns [`TransportError::AlreadyRunning`] from any other state.
	pub fn begin(&self, transport: &str) -> Result<ShutdownSignal, TransportError> {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		match *state {
			TransportState::Constructed => {
				*state = TransportState::Running;
				Ok(ShutdownSignal {
					receiver: self.shutdown.subscribe(),
				})
			}
			current => Err(TransportError::already_running(format!(
				"{} transport is {:?}; run() may only be called once",
				transport, current
			))),
		}
	}

	/// Moves to `Stopped`. Returns `false` when the transport was already stopped.
	pub fn stop(&self) -> bool {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		if *state == TransportState::Stopped {
			return false;
		}
		*state = TransportState::Stopped;
		self.shutdown.send_replace(true);
		true
	}
}

/// Receiving side of a lifecycle's stop notification
#[derive(Debug)]
pub struct ShutdownSignal {
	receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
	/// Resolves once the owning lifecycle has been stopped
	pub async fn wait(&mut self) {
		loop {
			if *self.receiver.borrow_and_update() {
				return;
			}
			if self.receiver.changed().await.is_err() {
				return;
			}
		}
	}
}
