//! Storage layer for memrec
//!
//! This crate implements the in-memory record store:
//! - RecordTable: ordered map of records with byte accounting, shared by handles
//! - JournalEntry: undo entries registered with the enclosing transaction
//! - RecordStore: named handle with capped and log-typed policy
//! - RecordCursor: forward and reverse iteration with save/restore
//!
//! Every mutation applies immediately and registers exactly one undo entry
//! per record it touches. Nothing here commits or aborts; that belongs to the
//! caller's [`RecoveryUnit`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod capped;
pub mod cursor;
pub mod journal;
pub mod patch;
pub mod stats;
pub mod store;
pub mod table;
pub mod validate;

pub use cursor::{CursorState, Direction, RecordCursor};
pub use journal::{JournalEntry, JournalEntryKind, RecoveryUnit};
pub use patch::Patch;
pub use stats::RECORD_OVERHEAD_BYTES;
pub use store::{RecordStore, ENGINE_NAME};
pub use table::{RecordTable, Records, TableData, TableId};
pub use validate::ValidateResults;
