//! Bootstrap module for wiring the indexer binary.
//!
//! Builds the orchestrator from the configuration on disk and the default subscriber set:
//! one logging subscriber per configured data-source handler, routed by filter name, plus a
//! catch-all that traces every delivered message.

use std::path::Path;
use tracing::{debug, info};

use crate::{
	models::{Config, ConfigLoader, DataSource, Message},
	services::{
		indexer::{Indexer, IndexerError},
		transport::Subscribers,
	},
};

/// Loads the config from `config_path` (or `fusion.json` in the working directory) and builds
/// the orchestrator. Nothing is installed or spawned yet.
pub fn initialize_indexer(config_path: Option<&Path>) -> Result<Indexer, IndexerError> {
	let config = match config_path {
		Some(path) => Config::load_from_path(path)?,
		None => Config::load_default()?,
	};
	info!(
		data_sources = config.data_sources.len(),
		filters = config.filters.len(),
		"Configuration loaded"
	);
	Indexer::from_config(config)
}

/// Subscribers the binary delivers to
pub fn create_subscribers(config: &Config) -> Subscribers {
	let mut subscribers = Subscribers::new();
	for source in &config.data_sources {
		register_data_source(&mut subscribers, source);
	}
	subscribers.subscribe(|message: &Message| {
		debug!(
			filter = %message.filter_name,
			message_hash = %message.message_hash,
			message_type = %message.message_type,
			block_id = %message.block_id,
			"Message delivered"
		);
	});
	subscribers
}

/// Routes messages admitted by a filter named after a handler to a logger for that handler
fn register_data_source(subscribers: &mut Subscribers, source: &DataSource) {
	for handler in &source.handlers {
		let name = handler.handler.clone();
		let kind = handler.kind.clone();
		let event = handler.event.clone();
		let origin = format!("{}:{}", source.src.kind, source.src.value);

		subscribers.subscribe_filter(handler.handler.clone(), move |message: &Message| {
			info!(
				handler = %name,
				kind = %kind,
				event = event.as_deref().unwrap_or("-"),
				origin = %origin,
				contract = %message.contract_name,
				message_hash = %message.message_hash,
				transaction_id = %message.transaction_id,
				"Handler received message"
			);
		});
	}
}
