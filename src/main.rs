//! Indexer supervisor entry point.
//!
//! Loads `fusion.json`, brings the configured transport up (installing, configuring and
//! spawning the indexer when the transport needs a local process) and logs every delivered
//! message until Ctrl+C or a fatal failure.

use clap::{Arg, Command};
use dotenvy::dotenv;
use fusion_indexer::{
	bootstrap::{create_subscribers, initialize_indexer},
	utils::{
		constants::CONFIG_HINT,
		logging::{setup_logging, LOG_LEVEL_ENV},
	},
};
use std::{
	env::{set_var, var},
	path::PathBuf,
	sync::Arc,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let matches = Command::new("fusion-indexer")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Supervises a blockchain indexer and delivers the messages it observes to \
			 configured handlers.",
		)
		.arg(
			Arg::new("config")
				.long("config")
				.help("Path to the indexer config (default: ./fusion.json)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.get_matches();

	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if let Some(level) = matches.get_one::<String>("log-level") {
		if var(LOG_LEVEL_ENV).is_err() {
			set_var(LOG_LEVEL_ENV, level);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_path = matches.get_one::<String>("config").map(PathBuf::from);
	let indexer = Arc::new(
		initialize_indexer(config_path.as_deref())
			.map_err(|e| anyhow::anyhow!("Failed to initialize indexer: {}. {}", e, CONFIG_HINT))?,
	);
	let subscribers = create_subscribers(indexer.config());

	info!(transport = %indexer.transport_kind(), "Indexer starting. Press Ctrl+C to shutdown");

	let runner = indexer.clone();
	let mut run = tokio::spawn(async move { runner.run(subscribers).await });

	let result = tokio::select! {
		result = &mut run => result,
		signal = tokio::signal::ctrl_c() => {
			if let Err(e) = signal {
				error!("Error waiting for Ctrl+C: {}", e);
			}
			info!("Shutdown signal received, stopping indexer...");
			indexer.stop();
			run.await
		}
	};

	match result {
		Ok(Ok(())) => {
			info!("Shutdown complete");
			Ok(())
		}
		Ok(Err(e)) => {
			error!(state = %indexer.state(), "Indexer failed: {}", e);
			Err(e.into())
		}
		Err(e) => Err(anyhow::anyhow!("Indexer task failed: {}", e)),
	}
}
