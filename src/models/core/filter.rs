use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved reference to either an account address or a contract code hash.
///
/// Serialized as `{"address": "..."}` or `{"code_hash": "..."}`; a document carrying both keys
/// (or neither) is rejected by the deserializer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AddressOrCodeHash {
	Address(String),
	CodeHash(String),
}

impl AddressOrCodeHash {
	pub fn address(&self) -> Option<&str> {
		match self {
			Self::Address(address) => Some(address),
			Self::CodeHash(_) => None,
		}
	}

	pub fn code_hash(&self) -> Option<&str> {
		match self {
			Self::Address(_) => None,
			Self::CodeHash(hash) => Some(hash),
		}
	}
}

/// Sender/receiver constraint as written in the config: either a raw string that still has to
/// be resolved, or an already tagged reference.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReferenceConstraint {
	Raw(String),
	Resolved(AddressOrCodeHash),
}

/// Directional message kinds
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
	InternalInbound,
	InternalOutbound,
	ExternalInbound,
	ExternalOutbound,
}

impl fmt::Display for MessageType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::InternalInbound => "internal_inbound",
			Self::InternalOutbound => "internal_outbound",
			Self::ExternalInbound => "external_inbound",
			Self::ExternalOutbound => "external_outbound",
		};
		write!(f, "{}", name)
	}
}

/// Generic filter kinds that are not scoped to a contract
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
	AnyMessage,
	NativeTransfer,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ContractRef {
	pub name: String,
	pub abi_path: String,
}

/// The `type` of a filter: a generic kind or a contract scope
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterKind {
	Generic(FilterType),
	Contract { contract: ContractRef },
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ContractMessage {
	/// Decoded message name; absent means any name
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(rename = "type")]
	pub type_: MessageType,
}

/// One alternative inside a filter. Every populated constraint must hold for the entry to
/// match; an entry without constraints matches everything its filter's kind admits.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MessageEntry {
	#[serde(default)]
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender: Option<ReferenceConstraint>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver: Option<ReferenceConstraint>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<ContractMessage>,
}

impl MessageEntry {
	pub fn is_unconstrained(&self) -> bool {
		self.sender.is_none() && self.receiver.is_none() && self.message.is_none()
	}
}

/// A named rule set deciding which messages reach subscribers
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MessageFilter {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: FilterKind,
	pub entries: Vec<MessageEntry>,
}

impl MessageFilter {
	/// Name of the contract this filter is scoped to, if any
	pub fn contract_name(&self) -> Option<&str> {
		match &self.kind {
			FilterKind::Contract { contract } => Some(contract.name.as_str()),
			FilterKind::Generic(_) => None,
		}
	}
}
