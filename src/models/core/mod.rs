//! Core domain models for the indexer supervisor.
//!
//! This module contains the fundamental data structures that represent:
//! - Config: the `fusion.json` document driving one indexer instance
//! - Filters: which on-chain messages subscribers care about
//! - Messages: decoded records handed to subscribers

mod config;
mod filter;
mod message;

pub use config::{
	Config, DataSource, DataSourceKind, Handler, PassthroughFields, ScanKind, ScanType, Source,
	StdioFraming, TransportConfig, TransportKind, DEFAULT_FILTER_NAME,
};
pub use filter::{
	AddressOrCodeHash, ContractMessage, ContractRef, FilterKind, FilterType, MessageEntry,
	MessageFilter, MessageType, ReferenceConstraint,
};
pub use message::{Block, Message, MessageParam};
