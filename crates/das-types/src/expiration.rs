//! # Expiration Policy
//!
//! How long a storage backend retains data it accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Retention policy reported by a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpirationPolicy {
    /// Data is kept forever.
    KeepForever,
    /// Data is kept until an archive timeout chosen by the storage operator.
    DiscardAfterArchiveTimeout,
    /// Data is kept until the timeout supplied with each put.
    DiscardAfterDataTimeout,
}

impl ExpirationPolicy {
    /// Map the `discard_after_timeout` configuration flag onto a policy.
    ///
    /// The flag only distinguishes two of the three policies;
    /// `DiscardAfterArchiveTimeout` is never produced from configuration.
    pub fn from_discard_flag(discard_after_timeout: bool) -> Self {
        if discard_after_timeout {
            ExpirationPolicy::DiscardAfterDataTimeout
        } else {
            ExpirationPolicy::KeepForever
        }
    }

    /// Whether a put with the given caller `timeout` should carry an expiry.
    pub fn expiry_for(&self, timeout: u64) -> Option<u64> {
        match self {
            ExpirationPolicy::DiscardAfterDataTimeout => Some(timeout),
            ExpirationPolicy::KeepForever | ExpirationPolicy::DiscardAfterArchiveTimeout => None,
        }
    }
}

impl fmt::Display for ExpirationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpirationPolicy::KeepForever => "KeepForever",
            ExpirationPolicy::DiscardAfterArchiveTimeout => "DiscardAfterArchiveTimeout",
            ExpirationPolicy::DiscardAfterDataTimeout => "DiscardAfterDataTimeout",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_flag_mapping() {
        assert_eq!(
            ExpirationPolicy::from_discard_flag(false),
            ExpirationPolicy::KeepForever
        );
        assert_eq!(
            ExpirationPolicy::from_discard_flag(true),
            ExpirationPolicy::DiscardAfterDataTimeout
        );
    }

    #[test]
    fn test_expiry_only_for_data_timeout() {
        assert_eq!(ExpirationPolicy::KeepForever.expiry_for(10), None);
        assert_eq!(
            ExpirationPolicy::DiscardAfterArchiveTimeout.expiry_for(10),
            None
        );
        assert_eq!(
            ExpirationPolicy::DiscardAfterDataTimeout.expiry_for(10),
            Some(10)
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            ExpirationPolicy::DiscardAfterArchiveTimeout.to_string(),
            "DiscardAfterArchiveTimeout"
        );
    }
}
