//! JSON-RPC reader for the sequencer inbox contract.
//!
//! Issues `eth_call` for `isBatchPoster(address)` at block `latest`.

use crate::ports::{LedgerError, SequencerInboxReader};
use async_trait::async_trait;
use das_types::{keccak256, Address};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct CallRequest {
    to: String,
    data: String,
}

pub struct JsonRpcSequencerInbox {
    http_client: reqwest::Client,
    rpc_url: String,
    inbox: Address,
    request_id: AtomicU64,
}

impl JsonRpcSequencerInbox {
    pub fn new(rpc_url: impl Into<String>, inbox: Address) -> Result<Self, LedgerError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            inbox,
            request_id: AtomicU64::new(1),
        })
    }

    async fn eth_call(&self, data: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_call",
            params: (
                CallRequest {
                    to: format!("0x{}", hex::encode(self.inbox)),
                    data: format!("0x{}", hex::encode(data)),
                },
                "latest",
            ),
            id: self.request_id.fetch_add(1, Ordering::SeqCst),
        };

        let response: JsonRpcResponse = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let result = response
            .result
            .ok_or_else(|| LedgerError::MalformedResponse("missing result".into()))?;
        decode_hex_data(&result)
    }
}

#[async_trait]
impl SequencerInboxReader for JsonRpcSequencerInbox {
    async fn is_batch_poster(&self, address: Address) -> Result<bool, LedgerError> {
        decode_bool(&self.eth_call(encode_is_batch_poster(&address)).await?)
    }
}

/// `isBatchPoster(address)` selector followed by the left-padded address.
pub fn encode_is_batch_poster(address: &Address) -> Vec<u8> {
    let selector = keccak256(b"isBatchPoster(address)");
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&selector[..4]);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(address);
    data
}

fn decode_hex_data(value: &str) -> Result<Vec<u8>, LedgerError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::MalformedResponse(format!("not hex data: {}", value)))?;
    hex::decode(digits).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
}

/// Decode an ABI `bool` return word.
fn decode_bool(word: &[u8]) -> Result<bool, LedgerError> {
    if word.len() != 32 || word[..31].iter().any(|b| *b != 0) {
        return Err(LedgerError::MalformedResponse(format!(
            "expected 32 byte bool, got 0x{}",
            hex::encode(word)
        )));
    }
    match word[31] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LedgerError::MalformedResponse(format!(
            "bool word ends in {}",
            other
        ))),
    }
}
