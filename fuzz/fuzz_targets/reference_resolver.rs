#![no_main]

use fusion_indexer::{
	models::AddressOrCodeHash,
	services::filter::{helpers::is_hex, resolve_reference},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
	match resolve_reference(data) {
		Ok(AddressOrCodeHash::Address(address)) => {
			assert_eq!(address, data);
			assert_eq!(data.matches(':').count(), 1);
		}
		Ok(AddressOrCodeHash::CodeHash(hash)) => {
			assert_eq!(hash, data);
			assert!(is_hex(data));
		}
		Err(_) => assert!(!is_hex(data)),
	}
});
