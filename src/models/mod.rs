//! Domain models and data structures for the indexer supervisor.
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (Config, MessageFilter, Message)

mod config;
mod core;

pub use core::{
	AddressOrCodeHash, Block, Config, ContractMessage, ContractRef, DataSource, DataSourceKind,
	FilterKind, FilterType, Handler, Message, MessageEntry, MessageFilter, MessageParam,
	MessageType, PassthroughFields, ReferenceConstraint, ScanKind, ScanType, Source,
	StdioFraming, TransportConfig, TransportKind, DEFAULT_FILTER_NAME,
};

pub use config::{ConfigError, ConfigLoader};
