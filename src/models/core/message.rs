use serde::{Deserialize, Serialize};

use crate::models::core::filter::MessageType;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MessageParam {
	pub name: String,
	pub value: String,
}

/// A decoded message as delivered to subscribers.
///
/// `filter_name` records which configured filter admitted the payload.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
	pub message: String,
	pub message_hash: String,
	pub message_type: MessageType,
	pub block_id: String,
	pub transaction_id: String,
	pub transaction_timestamp: u64,
	pub index_in_transaction: u32,
	pub contract_name: String,
	pub filter_name: String,
	pub params: Vec<MessageParam>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Block {
	pub id: String,
	pub seq_no: u64,
	pub boc: String,
	pub file_hash: String,
	pub shard: String,
	pub workchain_id: i32,
}
