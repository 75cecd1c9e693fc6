//! # Adapters
//!
//! - `json_rpc`: sequencer inbox reads over L1 JSON-RPC

pub mod json_rpc;
