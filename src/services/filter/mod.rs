//! Message filtering and decoding.
//!
//! - Address resolution for sender/receiver references
//! - Filter validation (fail fast at config load)
//! - Payload decoding with first-match-wins filter evaluation

mod decoder;
mod error;

pub mod helpers;

pub use decoder::{validate_filters, MessageDecoder, RawMessage};
pub use error::FilterError;
pub use helpers::resolve_reference;
