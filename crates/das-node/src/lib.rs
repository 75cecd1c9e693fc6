//! # DAS Node
//!
//! The data availability service: accepts blobs from a rollup batch poster,
//! stores them durably and returns a BLS-signed certificate promising they stay
//! retrievable until a timeout.
//!
//! ## Components
//!
//! - `service`: `DataAvailabilityService` (`store`, `get_by_hash`,
//!   `keyset_from_hash`, `health_check`)
//! - `authorizer`: batch poster check against the sequencer inbox
//! - `ports` / `adapters`: the L1 read port and its JSON-RPC implementation
//! - `config`: environment-driven configuration
//! - `errors`: the service error taxonomy
//!
//! Storage tiers live in `das-storage`; the signing identity in `das-signing`.

pub mod adapters;
pub mod authorizer;
pub mod config;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::json_rpc::JsonRpcSequencerInbox;
pub use authorizer::{parse_optional_address, BatchPosterVerifier};
pub use config::DataAvailabilityConfig;
pub use errors::{DasError, Unauthorized};
pub use ports::{LedgerError, SequencerInboxReader};
pub use service::DataAvailabilityService;
