#![no_main]

use fusion_indexer::{
	models::{FilterKind, FilterType, MessageEntry, MessageFilter},
	services::filter::MessageDecoder,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
	let decoder = match MessageDecoder::new(&[
		MessageFilter {
			name: "transfers".to_string(),
			kind: FilterKind::Generic(FilterType::NativeTransfer),
			entries: vec![MessageEntry::default()],
		},
		MessageFilter {
			name: "all".to_string(),
			kind: FilterKind::Generic(FilterType::AnyMessage),
			entries: vec![MessageEntry::default()],
		},
	]) {
		Ok(decoder) => decoder,
		Err(_) => return,
	};

	if let Ok(Some(message)) = decoder.decode(data) {
		assert!(message.filter_name == "transfers" || message.filter_name == "all");
	}
});
