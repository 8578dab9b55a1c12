use proptest::prelude::*;
use serde_json::{json, Value};

use fusion_indexer::models::MessageType;

const MAX_HEX_LEN: usize = 64;

pub fn hex_strategy() -> impl Strategy<Value = String> {
	prop::string::string_regex(&format!("[0-9a-fA-F]{{1,{}}}", MAX_HEX_LEN)).unwrap()
}

/// `workchain:hash` with both parts hexadecimal
pub fn address_strategy() -> impl Strategy<Value = String> {
	("[0-9a-f]{1,2}", hex_strategy()).prop_map(|(workchain, hash)| format!("{}:{}", workchain, hash))
}

/// Strings containing at least one character that is neither hex nor a separator
pub fn non_reference_strategy() -> impl Strategy<Value = String> {
	("[0-9a-f]{0,8}", "[g-zG-Z_ x-]", "[0-9a-f:]{0,8}")
		.prop_map(|(head, bad, tail)| format!("{}{}{}", head, bad, tail))
}

pub fn message_type_strategy() -> impl Strategy<Value = MessageType> {
	prop_oneof![
		Just(MessageType::InternalInbound),
		Just(MessageType::InternalOutbound),
		Just(MessageType::ExternalInbound),
		Just(MessageType::ExternalOutbound),
	]
}

/// Well-formed raw payloads with random routing fields
pub fn payload_strategy() -> impl Strategy<Value = Value> {
	(
		hex_strategy(),
		message_type_strategy(),
		any::<u64>(),
		any::<u32>(),
		prop::option::of(address_strategy()),
		prop::option::of("[0-9]{1,12}"),
	)
		.prop_map(|(hash, message_type, timestamp, index, sender, value)| {
			json!({
				"message_hash": hash,
				"message_type": message_type,
				"block_id": "block",
				"transaction_id": "tx",
				"transaction_timestamp": timestamp,
				"index_in_transaction": index,
				"sender": sender,
				"value": value,
			})
		})
}
