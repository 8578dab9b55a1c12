//! Core services of the indexer supervisor.
//!
//! - `filter`: address resolution and message decoding
//! - `transport`: the stdio, http2 and mock message transports
//! - `indexer`: orchestration and supervision of the indexer process

pub mod filter;
pub mod indexer;
pub mod transport;
