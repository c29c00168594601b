//! Public types for the memrec API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Record types
// ============================================================================

pub use memrec_core::log_id::log_payload;
pub use memrec_core::{LogTimestamp, Record, RecordData, RecordId};

// ============================================================================
// Configuration
// ============================================================================

pub use memrec_core::{CappedConfig, RecordStoreOptions};

// ============================================================================
// Errors
// ============================================================================

pub use memrec_core::{StoreError, StoreResult};

// ============================================================================
// Collaborator traits
// ============================================================================

pub use memrec_core::{
    CappedDeleteHook, DocWriter, JsonTimestampExtractor, LogIdExtractor, RecordValidator,
    UpdateNotifier,
};

// ============================================================================
// Storage
// ============================================================================

pub use memrec_storage::{
    CursorState, Direction, JournalEntry, JournalEntryKind, Patch, RecordCursor, RecordStore,
    RecordTable, RecoveryUnit, TableId, ValidateResults,
};

// ============================================================================
// Transactions
// ============================================================================

pub use memrec_concurrency::{TransactionContext, TransactionStatus, WriteUnitOfWork};

/// Document filled by [`RecordStore::append_custom_stats`]
pub type StatsDocument = serde_json::Map<String, serde_json::Value>;
