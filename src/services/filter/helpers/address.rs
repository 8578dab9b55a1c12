//! Address resolver.
//!
//! Turns raw reference strings into [`AddressOrCodeHash`] values. An address has the shape
//! `workchain:hash` with both segments hexadecimal; anything that is purely hexadecimal is a
//! code hash. No prefixes (`0x`) are accepted.

use crate::{
	models::{AddressOrCodeHash, ReferenceConstraint},
	services::filter::FilterError,
};

/// Non-empty and made only of `[0-9a-fA-F]`
pub fn is_hex(value: &str) -> bool {
	!value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_valid_address(value: &str) -> bool {
	let parts: Vec<&str> = value.split(':').collect();
	if parts.len() != 2 {
		return false;
	}
	is_hex(parts[0]) && is_hex(parts[1])
}

/// Resolves a raw string into an address or a code hash.
///
/// # Errors
/// Returns [`FilterError::InvalidReferenceFormat`] when the string is neither.
pub fn resolve_reference(raw: &str) -> Result<AddressOrCodeHash, FilterError> {
	if is_valid_address(raw) {
		Ok(AddressOrCodeHash::Address(raw.to_string()))
	} else if is_hex(raw) {
		Ok(AddressOrCodeHash::CodeHash(raw.to_string()))
	} else {
		Err(FilterError::invalid_reference_format(format!(
			"'{}' is not a contract address or code hash",
			raw
		)))
	}
}

/// Resolves a config constraint. Already tagged references are taken as written.
pub fn resolve_constraint(
	constraint: &ReferenceConstraint,
) -> Result<AddressOrCodeHash, FilterError> {
	match constraint {
		ReferenceConstraint::Raw(raw) => resolve_reference(raw),
		ReferenceConstraint::Resolved(reference) => Ok(reference.clone()),
	}
}

pub fn normalize_reference(value: &str) -> String {
	value.trim().to_lowercase()
}

pub fn are_same_reference(reference1: &str, reference2: &str) -> bool {
	normalize_reference(reference1) == normalize_reference(reference2)
}
