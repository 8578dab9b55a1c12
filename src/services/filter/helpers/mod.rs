//! Helper functions for filter implementations.
//!
//! Contains the address resolver used to validate and tag sender/receiver references.

pub mod address;

pub use address::{
	are_same_reference, is_hex, is_valid_address, normalize_reference, resolve_constraint,
	resolve_reference,
};
