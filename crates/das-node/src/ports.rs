//! # Outbound Ports (Driven Ports)
//!
//! The read-only L1 view the batch poster authorizer needs.

use async_trait::async_trait;
use das_types::Address;
use thiserror::Error;

/// Failure talking to the L1 node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("L1 request failed: {0}")]
    Transport(String),

    #[error("L1 RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed L1 response: {0}")]
    MalformedResponse(String),
}

/// Read access to the sequencer inbox contract.
#[async_trait]
pub trait SequencerInboxReader: Send + Sync {
    /// Whether `address` is currently an authorized batch poster.
    async fn is_batch_poster(&self, address: Address) -> Result<bool, LedgerError>;
}
