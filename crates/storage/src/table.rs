//! Shared record table
//!
//! An ordered map from `RecordId` to payload, plus the aggregate byte
//! counter and the identifier allocator.
//!
//! # Design
//!
//! - BTreeMap: records ordered by identifier, which is what cursors, capped
//!   eviction and start-position lookups all depend on
//! - Arc: every store handle over the same logical collection (e.g. across a
//!   rename) holds a reference to one table, never a copy
//! - RwLock: held only for the duration of a single call, never across a
//!   hook invocation. Coordinating writers is the caller's job.
//!
//! # Invariants
//!
//! - `data_size == sum(size of every record)` between calls
//! - The allocator only moves forward, truncation included
//! - Every mutating call registers exactly one undo entry per record touched

use crate::journal::{JournalEntry, RecoveryUnit};
use memrec_core::invariant;
use memrec_core::invariant::invariant_violation;
use memrec_core::{RecordData, RecordId, StoreError, StoreResult};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Ordered record map
pub type Records = BTreeMap<RecordId, RecordData>;

/// Identity of a table instance, used in logs and `Debug` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(Uuid);

impl TableId {
    fn new() -> Self {
        TableId(Uuid::new_v4())
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Table state behind the lock
#[derive(Debug)]
pub struct TableData {
    pub(crate) records: Records,
    pub(crate) data_size: u64,
    pub(crate) next_id: u64,
    pub(crate) is_log_typed: bool,
}

impl TableData {
    fn new(is_log_typed: bool) -> Self {
        Self {
            records: Records::new(),
            data_size: 0,
            next_id: RecordId::MIN.as_u64(),
            is_log_typed,
        }
    }

    /// Ordered records
    pub fn records(&self) -> &Records {
        &self.records
    }

    /// Sum of payload sizes
    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records are stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reference-counted handle to a table
///
/// Clone is cheap (just an Arc clone) and yields another handle to the
/// same records.
#[derive(Clone)]
pub struct RecordTable {
    id: TableId,
    inner: Arc<RwLock<TableData>>,
}

impl RecordTable {
    /// Create an empty table
    pub fn new(is_log_typed: bool) -> Self {
        Self {
            id: TableId::new(),
            inner: Arc::new(RwLock::new(TableData::new(is_log_typed))),
        }
    }

    /// Identity of this table
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Whether both handles refer to the same table
    pub fn same_table(&self, other: &RecordTable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this table
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, TableData> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, TableData> {
        self.inner.write()
    }

    /// Whether identifiers are derived from log timestamps
    pub fn is_log_typed(&self) -> bool {
        self.read().is_log_typed
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    /// True if no records are stored
    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// Sum of payload sizes
    pub fn data_size(&self) -> u64 {
        self.read().data_size
    }

    /// Payload stored at `id`, if any
    pub fn lookup(&self, id: RecordId) -> Option<RecordData> {
        self.read().records.get(&id).cloned()
    }

    /// Highest stored identifier
    pub fn max_id(&self) -> Option<RecordId> {
        self.read().records.keys().next_back().copied()
    }

    /// Lowest stored identifier
    pub fn min_id(&self) -> Option<RecordId> {
        self.read().records.keys().next().copied()
    }

    /// Copy of the current contents, in identifier order
    pub fn snapshot(&self) -> (Vec<(RecordId, RecordData)>, u64) {
        let data = self.read();
        let records = data
            .records
            .iter()
            .map(|(id, rec)| (*id, rec.clone()))
            .collect();
        (records, data.data_size)
    }

    // ========================================================================
    // Identifier Policy
    // ========================================================================

    /// Hand out the next generic identifier
    ///
    /// Strictly increasing per table; identifiers are never reused, not even
    /// after truncation or abort.
    pub fn allocate_id(&self) -> RecordId {
        let mut data = self.write();
        let out = RecordId::new(data.next_id);
        invariant!(
            out < RecordId::MAX,
            "record id allocator exhausted on table {}",
            self.id
        );
        data.next_id += 1;
        out
    }

    /// Accept a log-typed identifier only if it is above the current maximum
    ///
    /// An empty table places no constraint on the candidate. `NULL` and
    /// `MAX` are never stored, whatever the extractor produced.
    pub fn accept_log_id(&self, candidate: RecordId) -> StoreResult<RecordId> {
        if !candidate.is_normal() {
            return Err(StoreError::malformed(format!(
                "log identifier {} is not a normal record id",
                candidate
            )));
        }
        match self.max_id() {
            Some(highest) if candidate <= highest => {
                Err(StoreError::OutOfOrder { candidate, highest })
            }
            _ => Ok(candidate),
        }
    }

    // ========================================================================
    // Journaled Mutations
    // ========================================================================

    /// Insert a record under a fresh identifier
    ///
    /// `id` must not be present; a duplicate is a caller bug.
    pub fn insert(&self, txn: &mut dyn RecoveryUnit, id: RecordId, rec: RecordData) {
        let mut data = self.write();
        invariant!(
            !data.records.contains_key(&id),
            "duplicate record id {} on table {}",
            id,
            self.id
        );
        txn.register_undo(JournalEntry::insert(self.clone(), id));
        data.data_size += rec.size();
        data.records.insert(id, rec);
    }

    /// Remove the record at `id`, returning its payload
    ///
    /// The record must exist; callers wanting a soft delete check
    /// [`RecordTable::lookup`] first.
    pub fn remove(&self, txn: &mut dyn RecoveryUnit, id: RecordId) -> RecordData {
        let mut data = self.write();
        let Some(prior) = data.records.get(&id).cloned() else {
            invariant_violation(format_args!(
                "cannot remove missing record {} from table {}",
                id, self.id
            ));
        };
        txn.register_undo(JournalEntry::remove(self.clone(), id, prior.clone()));
        data.records.remove(&id);
        data.data_size -= prior.size();
        prior
    }

    /// Replace the payload at `id`, returning the previous payload
    ///
    /// Journaled exactly like a remove: abort restores the prior payload.
    pub fn replace(&self, txn: &mut dyn RecoveryUnit, id: RecordId, rec: RecordData) -> RecordData {
        let mut data = self.write();
        let Some(prior) = data.records.get(&id).cloned() else {
            invariant_violation(format_args!(
                "cannot update missing record {} in table {}",
                id, self.id
            ));
        };
        txn.register_undo(JournalEntry::remove(self.clone(), id, prior.clone()));
        data.data_size = data.data_size - prior.size() + rec.size();
        data.records.insert(id, rec);
        prior
    }

    /// Empty the table
    ///
    /// The records move into the undo entry right away; abort moves them back.
    pub fn truncate(&self, txn: &mut dyn RecoveryUnit) {
        txn.register_undo(JournalEntry::truncate(self.clone()));
    }

    /// Swap the table's contents with `records`/`data_size`
    pub(crate) fn swap_contents(&self, records: &mut Records, data_size: &mut u64) {
        let mut data = self.write();
        std::mem::swap(&mut data.records, records);
        std::mem::swap(&mut data.data_size, data_size);
    }
}

impl fmt::Debug for RecordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.read();
        f.debug_struct("RecordTable")
            .field("id", &self.id)
            .field("records", &data.records.len())
            .field("data_size", &data.data_size)
            .field("next_id", &data.next_id)
            .field("is_log_typed", &data.is_log_typed)
            .finish()
    }
}
