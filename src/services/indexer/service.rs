//! Indexer orchestrator.
//!
//! Drives the startup sequence
//! `Configured → Installing → Installed → ConfigGenerated → Spawned → Running`
//! for the configured transport and supervises the indexer process for as long as the
//! transport runs.

use std::{
	fmt,
	path::Path,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex,
	},
	time::Duration,
};
use tracing::{error, info, instrument, warn};

use crate::{
	models::{Config, ConfigLoader, TransportKind},
	services::{
		filter::MessageDecoder,
		indexer::{
			config_writer::generate_indexer_config,
			process::{spawn_indexer, ProcessControl, SupervisedProcess},
			IndexerError, Installer, LocalInstaller,
		},
		transport::{
			Http2Config, Http2Transport, MockTransport, OutputOwnership, StdioTransport,
			Subscribers, Transport, TransportError,
		},
	},
};

/// How long a process whose output stream closed is given to exit on its own
const OUTPUT_CLOSED_GRACE: Duration = Duration::from_secs(5);

/// Startup and supervision progress of an [`Indexer`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexerState {
	/// No configuration loaded yet
	Unconfigured,
	Configured,
	/// The run was claimed and the installer is being consulted
	Installing,
	/// The binary is present on disk
	Installed,
	/// The indexer's own config file was written
	ConfigGenerated,
	Spawned,
	Running,
	Stopped,
}

impl fmt::Display for IndexerState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

/// Builds the transport named by `config.transport.kind`, with its decoder.
///
/// # Errors
/// [`IndexerError::UnsupportedTransport`] for an unknown kind; filter and transport setup
/// errors otherwise.
pub fn create_transport(config: &Config) -> Result<Arc<dyn Transport>, IndexerError> {
	let kind: TransportKind = config
		.transport
		.kind
		.parse()
		.map_err(|_| IndexerError::UnsupportedTransport(config.transport.kind.clone()))?;
	let decoder = MessageDecoder::new(&config.filters)?;
	info!(filters = ?decoder.filter_names(), "Message decoder ready");

	let transport: Arc<dyn Transport> = match kind {
		TransportKind::Stdio => Arc::new(
			StdioTransport::new(decoder).with_framing(config.transport.framing.unwrap_or_default()),
		),
		TransportKind::Http2 => Arc::new(Http2Transport::new(
			config.transport.listen_address.as_deref(),
			decoder,
			Http2Config::default(),
		)?),
		TransportKind::Mock => Arc::new(MockTransport::from_config(config, decoder)?),
	};
	Ok(transport)
}

/// Supervises one indexer instance and delivers its messages to subscribers
pub struct Indexer {
	config: Config,
	transport: Arc<dyn Transport>,
	installer: Arc<dyn Installer>,
	state: Mutex<IndexerState>,
	stopping: AtomicBool,
	process: Mutex<Option<Arc<ProcessControl>>>,
}

impl Indexer {
	/// Loads `fusion.json` from the working directory and builds the configured transport.
	pub fn new() -> Result<Self, IndexerError> {
		let config = Config::load_default()?;
		Self::from_config(config)
	}

	/// Loads the config at `path` instead of the default location
	pub fn from_path(path: &Path) -> Result<Self, IndexerError> {
		let config = Config::load_from_path(path)?;
		Self::from_config(config)
	}

	pub fn from_config(config: Config) -> Result<Self, IndexerError> {
		Self::with_installer(config, Arc::new(LocalInstaller::new()))
	}

	/// Builds the orchestrator with a custom installer. Nothing is installed or spawned yet.
	pub fn with_installer(
		config: Config,
		installer: Arc<dyn Installer>,
	) -> Result<Self, IndexerError> {
		let transport = create_transport(&config)?;
		info!(transport = %transport.kind(), "Indexer configured");

		Ok(Self {
			config,
			transport,
			installer,
			state: Mutex::new(IndexerState::Configured),
			stopping: AtomicBool::new(false),
			process: Mutex::new(None),
		})
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn transport_kind(&self) -> TransportKind {
		self.transport.kind()
	}

	pub fn state(&self) -> IndexerState {
		*self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	fn set_state(&self, state: IndexerState) {
		*self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
	}

	/// Claims the single run by leaving `Configured`. A concurrent or later run, or a run after
	/// `stop()`, fails with [`IndexerError::AlreadyStarted`].
	fn claim(&self, next: IndexerState) -> Result<(), IndexerError> {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		if *state != IndexerState::Configured {
			return Err(IndexerError::AlreadyStarted);
		}
		*state = next;
		Ok(())
	}

	/// Brings the indexer up and delivers messages until stopped or a fatal failure occurs.
	///
	/// Process-backed transports install the binary, regenerate its config, spawn it and hand
	/// it to the transport before the transport starts consuming. An exit of the process that
	/// was not requested through [`Indexer::stop`] fails with
	/// [`IndexerError::UnexpectedTermination`].
	#[instrument(skip_all, fields(transport = %self.transport.kind()))]
	pub async fn run(&self, subscribers: Subscribers) -> Result<(), IndexerError> {
		let requires_process = self.transport.requires_process();
		self.claim(if requires_process {
			IndexerState::Installing
		} else {
			IndexerState::Running
		})?;

		let result = if requires_process {
			self.run_with_process(subscribers).await
		} else {
			self.run_transport(subscribers).await
		};

		self.set_state(IndexerState::Stopped);
		if let Err(e) = &result {
			error!(error = %e, "Indexer run failed");
		}
		result
	}

	async fn run_with_process(&self, subscribers: Subscribers) -> Result<(), IndexerError> {
		let paths = self.installer.ensure_install(&self.config.install_path)?;
		if self.stopping.load(Ordering::SeqCst) {
			info!("Stop requested during installation, not spawning");
			return Ok(());
		}
		self.set_state(IndexerState::Installed);

		generate_indexer_config(&self.config, &paths.data_dir())?;
		self.set_state(IndexerState::ConfigGenerated);

		let mut child = spawn_indexer(&paths)?;
		self.set_state(IndexerState::Spawned);

		let ownership = self.transport.on_process_started(&mut child);
		let process = SupervisedProcess::start(child, ownership == OutputOwnership::NotApplicable);
		let control = process.control();
		{
			let mut slot = self.process.lock().unwrap_or_else(|e| e.into_inner());
			*slot = Some(control.clone());
		}
		if self.stopping.load(Ordering::SeqCst) {
			control.request_stop();
		}

		self.set_state(IndexerState::Running);
		self.supervise(process, control, subscribers).await
	}

	async fn run_transport(&self, subscribers: Subscribers) -> Result<(), IndexerError> {
		match self.transport.run(subscribers).await {
			Err(TransportError::AlreadyRunning(_)) if self.stopping.load(Ordering::SeqCst) => Ok(()),
			result => result.map_err(IndexerError::from),
		}
	}

	async fn supervise(
		&self,
		process: SupervisedProcess,
		control: Arc<ProcessControl>,
		subscribers: Subscribers,
	) -> Result<(), IndexerError> {
		let exit = process.wait();
		tokio::pin!(exit);
		let transport_run = self.run_transport(subscribers);
		tokio::pin!(transport_run);

		tokio::select! {
			exit = &mut exit => {
				if exit.requested {
					return transport_run.await;
				}
				error!(status = %exit.describe(), "Indexer process exited unexpectedly");
				self.transport.stop();
				if let Err(e) = transport_run.await {
					warn!(error = %e, "Transport failed while the indexer was terminating");
				}
				Err(IndexerError::UnexpectedTermination(exit.describe()))
			}
			result = &mut transport_run => {
				if let Err(e) = result {
					control.request_stop();
					exit.await;
					return Err(e);
				}
				if control.stop_requested() {
					exit.await;
					return Ok(());
				}

				// The transport ended on its own; the process is expected to follow
				let waited = tokio::time::timeout(OUTPUT_CLOSED_GRACE, &mut exit).await;
				let exit = match waited {
					Ok(exit) => exit,
					Err(_) => {
						warn!("Indexer output closed but the process is still running, killing it");
						control.kill();
						exit.await
					}
				};
				if exit.requested {
					Ok(())
				} else {
					Err(IndexerError::UnexpectedTermination(exit.describe()))
				}
			}
		}
	}

	/// Stops the transport and the supervised process. Safe to call at any time, any number of
	/// times; a pending `run()` returns `Ok` afterwards.
	pub fn stop(&self) {
		if self.stopping.swap(true, Ordering::SeqCst) {
			return;
		}
		info!("Stopping indexer");

		let control = self
			.process
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone();
		if let Some(control) = control {
			control.request_stop();
		}
		self.transport.stop();

		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		if *state == IndexerState::Configured {
			*state = IndexerState::Stopped;
		}
	}
}
