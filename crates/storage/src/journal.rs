//! Change journal entries
//!
//! Mutations apply eagerly and register an undo entry with the enclosing
//! transaction at the same moment. The transaction later either commits
//! (entries are discarded) or aborts (entries are rolled back in reverse
//! registration order). The store never invokes its own entries.
//!
//! Exactly three shapes exist:
//!
//! | Entry | Rollback |
//! |-------|----------|
//! | `InsertUndo` | remove the id if still present, subtract its size |
//! | `RemoveUndo` | subtract the current size at the id if present, put the prior payload back |
//! | `TruncateUndo` | swap the captured records and byte count back into the table |
//!
//! `RemoveUndo` serves both deletes and updates. `TruncateUndo` is the one
//! entry whose side effect happens at construction: building it empties the
//! table.

use crate::table::{RecordTable, Records};
use memrec_core::{RecordData, RecordId};
use std::fmt;

/// Transaction capability the store registers undo entries with
pub trait RecoveryUnit {
    /// Take ownership of `entry`; called exactly once per record mutation
    fn register_undo(&mut self, entry: JournalEntry);
}

/// A bare journal: entries are pushed in registration order
impl RecoveryUnit for Vec<JournalEntry> {
    fn register_undo(&mut self, entry: JournalEntry) {
        self.push(entry);
    }
}

/// Kind of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEntryKind {
    /// Undoes an insert
    InsertUndo,
    /// Undoes a delete or an update
    RemoveUndo,
    /// Undoes a truncate
    TruncateUndo,
}

/// Undo information for one mutation, bound to the table it mutated
pub enum JournalEntry {
    /// Undoes an insert
    InsertUndo {
        /// Owning table
        table: RecordTable,
        /// Inserted id
        id: RecordId,
    },
    /// Undoes a delete or an update
    RemoveUndo {
        /// Owning table
        table: RecordTable,
        /// Mutated id
        id: RecordId,
        /// Payload immediately before the mutation
        prior: RecordData,
    },
    /// Undoes a truncate
    TruncateUndo {
        /// Owning table
        table: RecordTable,
        /// Records removed by the truncate
        records: Records,
        /// Byte count removed by the truncate
        data_size: u64,
    },
}

impl JournalEntry {
    pub(crate) fn insert(table: RecordTable, id: RecordId) -> Self {
        JournalEntry::InsertUndo { table, id }
    }

    pub(crate) fn remove(table: RecordTable, id: RecordId, prior: RecordData) -> Self {
        JournalEntry::RemoveUndo { table, id, prior }
    }

    /// Empties `table` immediately, keeping its contents for rollback
    pub(crate) fn truncate(table: RecordTable) -> Self {
        let mut records = Records::new();
        let mut data_size = 0;
        table.swap_contents(&mut records, &mut data_size);
        JournalEntry::TruncateUndo {
            table,
            records,
            data_size,
        }
    }

    /// Kind of this entry
    pub fn kind(&self) -> JournalEntryKind {
        match self {
            JournalEntry::InsertUndo { .. } => JournalEntryKind::InsertUndo,
            JournalEntry::RemoveUndo { .. } => JournalEntryKind::RemoveUndo,
            JournalEntry::TruncateUndo { .. } => JournalEntryKind::TruncateUndo,
        }
    }

    /// Table this entry is bound to
    pub fn table(&self) -> &RecordTable {
        match self {
            JournalEntry::InsertUndo { table, .. }
            | JournalEntry::RemoveUndo { table, .. }
            | JournalEntry::TruncateUndo { table, .. } => table,
        }
    }

    /// Record id, for the per-record entries
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            JournalEntry::InsertUndo { id, .. } | JournalEntry::RemoveUndo { id, .. } => Some(*id),
            JournalEntry::TruncateUndo { .. } => None,
        }
    }

    /// Discard the entry; the mutation stands
    pub fn commit(self) {}

    /// Reverse the mutation
    pub fn rollback(self) {
        match self {
            JournalEntry::InsertUndo { table, id } => {
                let mut data = table.write();
                if let Some(rec) = data.records.remove(&id) {
                    data.data_size -= rec.size();
                }
            }
            JournalEntry::RemoveUndo { table, id, prior } => {
                let mut data = table.write();
                data.data_size += prior.size();
                if let Some(current) = data.records.insert(id, prior) {
                    data.data_size -= current.size();
                }
            }
            JournalEntry::TruncateUndo {
                table,
                mut records,
                mut data_size,
            } => {
                table.swap_contents(&mut records, &mut data_size);
            }
        }
    }
}

impl fmt::Debug for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalEntry::InsertUndo { table, id } => f
                .debug_struct("InsertUndo")
                .field("table", &table.id())
                .field("id", id)
                .finish(),
            JournalEntry::RemoveUndo { table, id, prior } => f
                .debug_struct("RemoveUndo")
                .field("table", &table.id())
                .field("id", id)
                .field("prior_size", &prior.size())
                .finish(),
            JournalEntry::TruncateUndo {
                table,
                records,
                data_size,
            } => f
                .debug_struct("TruncateUndo")
                .field("table", &table.id())
                .field("records", &records.len())
                .field("data_size", data_size)
                .finish(),
        }
    }
}
