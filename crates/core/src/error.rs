//! Recoverable errors
//!
//! Every variant here is surfaced to the caller and leaves the table
//! untouched by the failing call. Programmer errors (operating on a record
//! that must exist but does not) are not represented: they go through
//! [`crate::invariant`] and terminate instead.

use crate::types::RecordId;
use thiserror::Error;

/// Result alias used throughout memrec
pub type StoreResult<T> = Result<T, StoreError>;

/// Recoverable record store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Payload is larger than a capped table's byte ceiling
    #[error("object of {size} bytes exceeds capped max size of {max_bytes} bytes")]
    ExceedsCapacity {
        /// Size of the rejected payload
        size: u64,
        /// Capped byte ceiling
        max_bytes: u64,
    },

    /// Update would grow a record in a capped table
    #[error("objects in a capped collection cannot grow: record {id} from {old_size} to {new_size} bytes")]
    CappedGrowthNotAllowed {
        /// Record being updated
        id: RecordId,
        /// Current size
        old_size: u64,
        /// Requested size
        new_size: u64,
    },

    /// Log identifier not strictly greater than the table maximum
    #[error("log identifier {candidate} is not higher than highest {highest}")]
    OutOfOrder {
        /// Identifier derived from the payload
        candidate: RecordId,
        /// Current table maximum
        highest: RecordId,
    },

    /// Log identifier could not be extracted from the payload
    #[error("malformed log entry: {reason}")]
    MalformedLogEntry {
        /// What was wrong with the payload
        reason: String,
    },

    /// A collaborator hook or notifier refused the operation
    #[error("{hook} failed: {reason}")]
    HookFailed {
        /// Which hook failed
        hook: String,
        /// Reason reported by the hook
        reason: String,
    },

    /// Construction-time options were rejected
    #[error("invalid record store configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },
}

impl StoreError {
    /// Build a `MalformedLogEntry`
    pub fn malformed(reason: impl Into<String>) -> Self {
        StoreError::MalformedLogEntry {
            reason: reason.into(),
        }
    }

    /// Build a `HookFailed`
    pub fn hook(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::HookFailed {
            hook: hook.into(),
            reason: reason.into(),
        }
    }

    /// Build an `InvalidConfig`
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        StoreError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Stable name of the error class, for logs and status reporting
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::ExceedsCapacity { .. } => "ExceedsCapacity",
            StoreError::CappedGrowthNotAllowed { .. } => "CappedGrowthNotAllowed",
            StoreError::OutOfOrder { .. } => "OutOfOrder",
            StoreError::MalformedLogEntry { .. } => "MalformedLogEntry",
            StoreError::HookFailed { .. } => "HookFailed",
            StoreError::InvalidConfig { .. } => "InvalidConfig",
        }
    }
}
