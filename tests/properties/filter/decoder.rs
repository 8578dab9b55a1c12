//! Property-based tests for the message decoder.

use proptest::prelude::*;
use serde_json::Value;

use fusion_indexer::{
	models::{FilterKind, FilterType, MessageEntry, MessageFilter, ReferenceConstraint},
	services::filter::MessageDecoder,
};

use crate::properties::strategies::{address_strategy, payload_strategy};

fn filter(name: &str, kind: FilterType, entry: MessageEntry) -> MessageFilter {
	MessageFilter {
		name: name.to_string(),
		kind: FilterKind::Generic(kind),
		entries: vec![entry],
	}
}

proptest! {
	#![proptest_config(ProptestConfig {
		cases: 256, ..ProptestConfig::default()
	})]

	#[test]
	fn test_any_message_admits_every_payload(payload in payload_strategy()) {
		let decoder = MessageDecoder::new(&[filter("all", FilterType::AnyMessage, MessageEntry::default())]).unwrap();
		let message = decoder.decode_value(payload.clone()).unwrap().unwrap();

		prop_assert_eq!(message.filter_name, "all");
		prop_assert_eq!(Some(message.message_hash.as_str()), payload["message_hash"].as_str());
		prop_assert_eq!(Some(message.transaction_timestamp), payload["transaction_timestamp"].as_u64());
	}

	#[test]
	fn test_sender_constraint_admits_only_that_sender(
		payload in payload_strategy(),
		expected in address_strategy(),
	) {
		let entry = MessageEntry {
			name: "by_sender".to_string(),
			sender: Some(ReferenceConstraint::Raw(expected.clone())),
			..MessageEntry::default()
		};
		let decoder = MessageDecoder::new(&[filter("by_sender", FilterType::AnyMessage, entry)]).unwrap();

		let admitted = decoder.decode_value(payload.clone()).unwrap().is_some();
		let same_sender = payload["sender"]
			.as_str()
			.map(|sender| sender.eq_ignore_ascii_case(&expected))
			.unwrap_or(false);
		prop_assert_eq!(admitted, same_sender);
	}

	#[test]
	fn test_native_transfer_requires_value(payload in payload_strategy()) {
		let decoder = MessageDecoder::new(&[filter("transfers", FilterType::NativeTransfer, MessageEntry::default())]).unwrap();

		let admitted = decoder.decode_value(payload.clone()).unwrap().is_some();
		let carries_value = payload["value"]
			.as_str()
			.map(|v| v.chars().any(|c| c != '0'))
			.unwrap_or(false);
		prop_assert_eq!(admitted, carries_value);
	}

	#[test]
	fn test_decode_never_panics_on_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
		let decoder = MessageDecoder::new(&[filter("all", FilterType::AnyMessage, MessageEntry::default())]).unwrap();
		let _ = decoder.decode(&bytes);
	}

	#[test]
	fn test_decode_rejects_payloads_without_hash(mut payload in payload_strategy()) {
		let decoder = MessageDecoder::new(&[filter("all", FilterType::AnyMessage, MessageEntry::default())]).unwrap();
		if let Value::Object(fields) = &mut payload {
			fields.remove("message_hash");
		}
		prop_assert!(decoder.decode_value(payload).is_err());
	}
}
