//! Indexer configuration model.
//!
//! Mirrors the `fusion.json` document read at startup. The document is loaded once and never
//! mutated; the orchestrator forwards it (minus `install_path`) to the supervised indexer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

use crate::models::core::filter::{FilterKind, FilterType, MessageEntry, MessageFilter};

/// Default filter name used when the config declares no filters
pub const DEFAULT_FILTER_NAME: &str = "all";

/// Keys the indexer does not interpret itself but that must reach it unchanged
pub type PassthroughFields = Map<String, Value>;

/// Process-wide configuration for one indexer instance
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
	/// Where the indexer binary lives or will be installed
	pub install_path: String,

	/// RPC settings of the supervised indexer, passed through untouched
	pub rpc_config: Value,

	/// Metrics settings of the supervised indexer, passed through untouched
	pub metrics_settings: Value,

	/// Routing metadata binding handlers to on-chain origins
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub data_sources: Vec<DataSource>,

	/// Transport selection
	pub transport: TransportConfig,

	/// Replay vs. live scanning
	pub scan_type: ScanType,

	/// Filters evaluated by the message decoder, in order
	#[serde(default = "default_filters")]
	pub filters: Vec<MessageFilter>,

	#[serde(flatten)]
	pub extra: PassthroughFields,
}

fn default_filters() -> Vec<MessageFilter> {
	vec![MessageFilter {
		name: DEFAULT_FILTER_NAME.to_string(),
		kind: FilterKind::Generic(FilterType::AnyMessage),
		entries: vec![MessageEntry::default()],
	}]
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Source {
	pub kind: String,
	pub value: String,
	#[serde(flatten)]
	pub extra: PassthroughFields,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Handler {
	pub kind: String,
	pub handler: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub event: Option<String>,
	#[serde(flatten)]
	pub extra: PassthroughFields,
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
	Message,
	Contract,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DataSource {
	pub source: DataSourceKind,
	pub src: Source,
	pub handlers: Vec<Handler>,
	#[serde(flatten)]
	pub extra: PassthroughFields,
}

/// Transport section of the config.
///
/// `kind` stays a plain string so that an unknown value is reported by the orchestrator as an
/// unsupported transport instead of failing the whole document parse.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TransportConfig {
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub listen_address: Option<String>,
	/// Payload delimiting on the indexer's stdout; only read by the stdio transport
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub framing: Option<StdioFraming>,
	#[serde(flatten)]
	pub extra: PassthroughFields,
}

/// How payloads are delimited on the process output
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StdioFraming {
	/// One JSON payload per line. Lines that are not JSON objects are indexer log output.
	#[default]
	Lines,
	/// A big-endian `u32` length followed by that many bytes of JSON
	LengthPrefixed,
}

/// The closed set of transport strategies
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransportKind {
	Stdio,
	Http2,
	Mock,
}

impl FromStr for TransportKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"stdio" => Ok(Self::Stdio),
			"http2" => Ok(Self::Http2),
			"mock" => Ok(Self::Mock),
			other => Err(format!("unsupported transport type: {}", other)),
		}
	}
}

impl fmt::Display for TransportKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Stdio => write!(f, "Stdio"),
			Self::Http2 => write!(f, "Http2"),
			Self::Mock => write!(f, "Mock"),
		}
	}
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum ScanKind {
	#[serde(rename = "TestJson", alias = "test")]
	Test,
	#[serde(rename = "FromNetwork", alias = "network")]
	Network,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScanType {
	pub kind: ScanKind,
	pub filename: String,
	#[serde(flatten)]
	pub extra: PassthroughFields,
}
