//! Runtime configuration for message ports.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Recommended upper bound for an encoded payload, in bytes.
pub const RECOMMENDED_MAX_PAYLOAD_BYTES: usize = 4 * 1024;

/// Default number of queued deliveries drained by one dispatch pass.
pub const DEFAULT_DISPATCH_BATCH_LIMIT: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1023);

/// Tuning knobs shared by every port created from one context.
///
/// # Examples
///
/// ```
/// use msgport::port::config::PortConfig;
///
/// let config = PortConfig::default();
/// assert!(!config.enforce_payload_limit);
///
/// let strict = PortConfig::strict();
/// assert!(strict.enforce_payload_limit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Soft limit for encoded outbound payloads.
    pub max_payload_bytes: usize,
    /// Reject payloads above the soft limit locally instead of only warning.
    pub enforce_payload_limit: bool,
    /// Maximum deliveries handed to observers per `dispatch_pending` call.
    /// Zero is rejected when deserializing.
    pub dispatch_batch_limit: NonZeroUsize,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: RECOMMENDED_MAX_PAYLOAD_BYTES,
            enforce_payload_limit: false,
            dispatch_batch_limit: DEFAULT_DISPATCH_BATCH_LIMIT,
        }
    }
}

impl PortConfig {
    /// Creates a configuration that rejects oversized payloads before they
    /// reach the transport.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_payload_bytes: RECOMMENDED_MAX_PAYLOAD_BYTES,
            enforce_payload_limit: true,
            dispatch_batch_limit: DEFAULT_DISPATCH_BATCH_LIMIT,
        }
    }

    /// Overrides the payload soft limit.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    /// Overrides the number of deliveries drained per dispatch pass.
    #[must_use]
    pub const fn with_dispatch_batch_limit(mut self, limit: NonZeroUsize) -> Self {
        self.dispatch_batch_limit = limit;
        self
    }
}
