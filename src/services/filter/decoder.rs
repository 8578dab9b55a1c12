//! Message decoder.
//!
//! Turns raw transport payloads into [`Message`] records. Filters are evaluated in
//! configuration order and the first one that admits a payload names it; payloads no filter
//! admits are dropped silently.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
	models::{
		AddressOrCodeHash, ContractMessage, FilterKind, FilterType, Message, MessageFilter,
		MessageParam, MessageType, ReferenceConstraint,
	},
	services::filter::{
		helpers::{are_same_reference, resolve_constraint},
		FilterError,
	},
};

/// Payload shape produced by the indexer for every observed message
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RawMessage {
	#[serde(default)]
	pub message: String,
	pub message_hash: String,
	pub message_type: MessageType,
	pub block_id: String,
	pub transaction_id: String,
	pub transaction_timestamp: u64,
	#[serde(default)]
	pub index_in_transaction: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contract_name: Option<String>,
	/// Decoded message (function or event) name, when the ABI was known
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender_code_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver_code_hash: Option<String>,
	/// Native value carried by the message
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	#[serde(default)]
	pub params: Vec<MessageParam>,
}

impl RawMessage {
	/// A plain value transfer: no decoded body, non-zero value
	pub fn is_native_transfer(&self) -> bool {
		let carries_value = self
			.value
			.as_deref()
			.map(|v| !v.trim().trim_start_matches('0').is_empty())
			.unwrap_or(false);
		self.name.is_none() && carries_value
	}
}

#[derive(Debug, Clone)]
struct ActiveEntry {
	sender: Option<AddressOrCodeHash>,
	receiver: Option<AddressOrCodeHash>,
	message: Option<ContractMessage>,
}

/// A filter whose references have been resolved
#[derive(Debug, Clone)]
struct ActiveFilter {
	name: String,
	kind: FilterKind,
	entries: Vec<ActiveEntry>,
}

impl ActiveFilter {
	fn activate(filter: &MessageFilter) -> Result<Self, FilterError> {
		if filter.name.trim().is_empty() {
			return Err(FilterError::invalid_filter("filter name must not be empty"));
		}

		if filter.entries.is_empty() {
			return Err(FilterError::invalid_filter(format!(
				"filter '{}' has no entries",
				filter.name
			)));
		}

		let entries = filter
			.entries
			.iter()
			.map(|entry| {
				let resolve = |constraint: &ReferenceConstraint| {
					resolve_constraint(constraint).map_err(|e| {
						FilterError::invalid_filter(format!("filter '{}': {}", filter.name, e))
					})
				};
				Ok(ActiveEntry {
					sender: entry.sender.as_ref().map(resolve).transpose()?,
					receiver: entry.receiver.as_ref().map(resolve).transpose()?,
					message: entry.message.clone(),
				})
			})
			.collect::<Result<Vec<_>, FilterError>>()?;

		Ok(Self {
			name: filter.name.clone(),
			kind: filter.kind.clone(),
			entries,
		})
	}

	fn kind_matches(&self, raw: &RawMessage) -> bool {
		match &self.kind {
			FilterKind::Generic(FilterType::AnyMessage) => true,
			FilterKind::Generic(FilterType::NativeTransfer) => raw.is_native_transfer(),
			FilterKind::Contract { contract } => raw
				.contract_name
				.as_deref()
				.map(|name| name == contract.name)
				.unwrap_or(false),
		}
	}

	fn matches(&self, raw: &RawMessage) -> bool {
		self.kind_matches(raw) && self.entries.iter().any(|entry| entry_matches(entry, raw))
	}
}

fn reference_matches(
	reference: &AddressOrCodeHash,
	address: Option<&str>,
	code_hash: Option<&str>,
) -> bool {
	match reference {
		AddressOrCodeHash::Address(expected) => address
			.map(|actual| are_same_reference(expected, actual))
			.unwrap_or(false),
		AddressOrCodeHash::CodeHash(expected) => code_hash
			.map(|actual| are_same_reference(expected, actual))
			.unwrap_or(false),
	}
}

fn entry_matches(entry: &ActiveEntry, raw: &RawMessage) -> bool {
	if let Some(sender) = &entry.sender {
		if !reference_matches(sender, raw.sender.as_deref(), raw.sender_code_hash.as_deref()) {
			return false;
		}
	}

	if let Some(receiver) = &entry.receiver {
		if !reference_matches(
			receiver,
			raw.receiver.as_deref(),
			raw.receiver_code_hash.as_deref(),
		) {
			return false;
		}
	}

	if let Some(message) = &entry.message {
		if message.type_ != raw.message_type {
			return false;
		}
		if let Some(name) = &message.name {
			if raw.name.as_deref() != Some(name.as_str()) {
				return false;
			}
		}
	}

	true
}

/// Checks that every filter can be activated: non-empty entries and resolvable references.
pub fn validate_filters(filters: &[MessageFilter]) -> Result<(), FilterError> {
	filters.iter().try_for_each(|f| ActiveFilter::activate(f).map(|_| ()))
}

/// Decodes payloads and applies the configured filter set
#[derive(Debug, Clone)]
pub struct MessageDecoder {
	filters: Vec<ActiveFilter>,
}

impl MessageDecoder {
	/// Builds a decoder, resolving every sender/receiver reference up front.
	///
	/// # Errors
	/// Returns [`FilterError::InvalidFilter`] for a filter without entries or with an
	/// unresolvable reference.
	pub fn new(filters: &[MessageFilter]) -> Result<Self, FilterError> {
		let filters = filters
			.iter()
			.map(ActiveFilter::activate)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { filters })
	}

	pub fn filter_names(&self) -> Vec<&str> {
		self.filters.iter().map(|f| f.name.as_str()).collect()
	}

	/// Decodes a JSON encoded payload.
	///
	/// Returns `Ok(None)` when no filter admits the payload.
	pub fn decode(&self, raw: &[u8]) -> Result<Option<Message>, FilterError> {
		let raw: RawMessage = serde_json::from_slice(raw)?;
		Ok(self.decode_raw(raw))
	}

	/// Decodes an already parsed payload
	pub fn decode_value(&self, value: serde_json::Value) -> Result<Option<Message>, FilterError> {
		let raw: RawMessage = serde_json::from_value(value)?;
		Ok(self.decode_raw(raw))
	}

	pub fn decode_raw(&self, raw: RawMessage) -> Option<Message> {
		let filter = match self.filters.iter().find(|f| f.matches(&raw)) {
			Some(filter) => filter,
			None => {
				debug!(message_hash = %raw.message_hash, "Payload matched no filter, dropping");
				return None;
			}
		};

		let contract_name = raw
			.contract_name
			.or_else(|| match &filter.kind {
				FilterKind::Contract { contract } => Some(contract.name.clone()),
				FilterKind::Generic(_) => None,
			})
			.unwrap_or_default();

		Some(Message {
			message: raw.message,
			message_hash: raw.message_hash,
			message_type: raw.message_type,
			block_id: raw.block_id,
			transaction_id: raw.transaction_id,
			transaction_timestamp: raw.transaction_timestamp,
			index_in_transaction: raw.index_in_transaction,
			contract_name,
			filter_name: filter.name.clone(),
			params: raw.params,
		})
	}
}
