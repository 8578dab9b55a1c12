//! Spawning and supervision of the indexer subprocess.
//!
//! The child is owned by a single supervisor task that relays its output, waits for it to exit
//! and kills it on request. Whether an exit was asked for is recorded before the kill is sent,
//! so the orchestrator can tell a requested shutdown from a crash.

use std::{
	path::Path,
	process::{ExitStatus, Stdio},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};
use tokio::{
	io::{AsyncRead, AsyncWrite},
	process::{Child, Command},
	sync::watch,
	task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::services::indexer::{
	config_writer::{GLOBAL_CONFIG_FILE, INDEXER_CONFIG_FILE},
	IndexerError, InstallPaths,
};

/// Starts the indexer binary from its own directory, pointed at the generated config.
pub fn spawn_indexer(paths: &InstallPaths) -> Result<Child, IndexerError> {
	let data_dir = paths.data_dir();
	let exec = &paths.exec_full_path;
	let spawn_error = |reason: String| IndexerError::Spawn {
		path: exec.clone(),
		reason,
	};

	let working_dir = exec
		.parent()
		.filter(|dir| !dir.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));

	let child = Command::new(exec)
		.arg("--config")
		.arg(data_dir.join(INDEXER_CONFIG_FILE))
		.arg("--global-config")
		.arg(data_dir.join(GLOBAL_CONFIG_FILE))
		.current_dir(working_dir)
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true)
		.spawn()
		.map_err(|e| spawn_error(e.to_string()))?;

	info!(path = %exec.display(), pid = ?child.id(), "Indexer process spawned");
	Ok(child)
}

/// Shared handle for requesting a supervised process to exit
#[derive(Debug)]
pub struct ProcessControl {
	stop_requested: AtomicBool,
	kill: watch::Sender<bool>,
}

impl ProcessControl {
	fn new() -> (Arc<Self>, watch::Receiver<bool>) {
		let (kill, receiver) = watch::channel(false);
		let control = Arc::new(Self {
			stop_requested: AtomicBool::new(false),
			kill,
		});
		(control, receiver)
	}

	/// Marks the exit as requested and kills the process. Idempotent.
	pub fn request_stop(&self) {
		self.stop_requested.store(true, Ordering::SeqCst);
		self.kill.send_replace(true);
	}

	/// Kills the process without marking the exit as requested
	pub fn kill(&self) {
		self.kill.send_replace(true);
	}

	pub fn stop_requested(&self) -> bool {
		self.stop_requested.load(Ordering::SeqCst)
	}
}

/// How the supervised process ended
#[derive(Debug)]
pub struct ProcessExit {
	pub status: Result<ExitStatus, String>,
	pub requested: bool,
}

impl ProcessExit {
	pub fn describe(&self) -> String {
		match &self.status {
			Ok(status) => status.to_string(),
			Err(e) => format!("failed to observe exit: {}", e),
		}
	}
}

/// A running indexer process under supervision
pub struct SupervisedProcess {
	control: Arc<ProcessControl>,
	waiter: JoinHandle<Result<ExitStatus, String>>,
}

impl SupervisedProcess {
	/// Takes ownership of `child`. Its stderr is always relayed; its stdout only when
	/// `relay_stdout` is set, i.e. when no transport consumes it.
	pub fn start(mut child: Child, relay_stdout: bool) -> Self {
		if let Some(stderr) = child.stderr.take() {
			tokio::spawn(relay_output(stderr, tokio::io::stderr()));
		}
		if relay_stdout {
			if let Some(stdout) = child.stdout.take() {
				tokio::spawn(relay_output(stdout, tokio::io::stdout()));
			}
		}

		let (control, kill) = ProcessControl::new();
		let waiter = tokio::spawn(wait_or_kill(child, kill));
		Self { control, waiter }
	}

	pub fn control(&self) -> Arc<ProcessControl> {
		self.control.clone()
	}

	/// Resolves once the process has exited
	pub async fn wait(self) -> ProcessExit {
		let status = match self.waiter.await {
			Ok(status) => status,
			Err(e) => Err(e.to_string()),
		};
		ProcessExit {
			status,
			requested: self.control.stop_requested(),
		}
	}
}

async fn wait_or_kill(mut child: Child, mut kill: watch::Receiver<bool>) -> Result<ExitStatus, String> {
	loop {
		tokio::select! {
			status = child.wait() => {
				let status = status.map_err(|e| e.to_string());
				info!(status = ?status, "Indexer process exited");
				return status;
			}
			changed = kill.changed() => {
				if changed.is_err() || *kill.borrow_and_update() {
					debug!("Killing indexer process");
					if let Err(e) = child.kill().await {
						warn!(error = %e, "Failed to kill indexer process");
					}
					return child.wait().await.map_err(|e| e.to_string());
				}
			}
		}
	}
}

/// Copies `source` to `sink` unmodified until the source closes.
///
/// If the sink fails the source is still drained, so the process never blocks on a full pipe.
async fn relay_output<R, W>(mut source: R, mut sink: W)
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	if let Err(e) = tokio::io::copy(&mut source, &mut sink).await {
		warn!(error = %e, "Failed to relay indexer output, discarding the rest");
		if let Err(e) = tokio::io::copy(&mut source, &mut tokio::io::sink()).await {
			warn!(error = %e, "Failed to read indexer output");
		}
	}
}
