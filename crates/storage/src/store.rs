//! Record store handle
//!
//! A `RecordStore` is a named handle over a shared [`RecordTable`] plus the
//! policy that governs it: capped ceilings, identifier mode, and the hooks
//! collaborators plug in. Several handles may share one table (e.g. the old
//! and new name across a rename).
//!
//! # Example
//!
//! ```
//! use memrec_core::{CappedConfig, RecordStoreOptions};
//! use memrec_storage::{Direction, JournalEntry, RecordStore};
//!
//! let store = RecordStore::new(
//!     "app.events",
//!     RecordStoreOptions::new().capped(CappedConfig::new(1024).with_max_docs(2)),
//! )
//! .unwrap();
//!
//! let mut journal: Vec<JournalEntry> = Vec::new();
//! for payload in [&b"a"[..], b"b", b"c"] {
//!     store.insert_record(&mut journal, payload).unwrap();
//! }
//! assert_eq!(store.num_records(), 2);
//!
//! let ids: Vec<u64> = store
//!     .get_cursor(Direction::Forward)
//!     .map(|rec| rec.id.as_u64())
//!     .collect();
//! assert_eq!(ids, vec![2, 3]);
//! ```

use crate::cursor::{Direction, RecordCursor};
use crate::journal::RecoveryUnit;
use crate::table::RecordTable;
use memrec_core::invariant::invariant_violation;
use memrec_core::{
    CappedConfig, CappedDeleteHook, DocWriter, JsonTimestampExtractor, LogIdExtractor,
    RecordData, RecordId, RecordStoreOptions, StoreError, StoreResult, UpdateNotifier,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Engine name reported by [`RecordStore::name`]
pub const ENGINE_NAME: &str = "InMemory";

/// Transactional record store over a shared table
pub struct RecordStore {
    ns: String,
    table: RecordTable,
    pub(crate) capped: Option<CappedConfig>,
    pub(crate) capped_delete_hook: Option<Arc<dyn CappedDeleteHook>>,
    log_id_extractor: Arc<dyn LogIdExtractor>,
}

impl RecordStore {
    /// Create a store over a new, empty table
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the capped ceilings are invalid.
    pub fn new(ns: impl Into<String>, options: RecordStoreOptions) -> StoreResult<Self> {
        options.validate()?;
        let table = RecordTable::new(options.log_typed);
        Ok(Self::build(ns.into(), options, table))
    }

    /// Create a store over an existing table
    ///
    /// The table keeps the identifier mode it was created with; options that
    /// disagree with it are rejected.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the capped ceilings are invalid or the identifier
    /// mode does not match the table's.
    pub fn with_shared_table(
        ns: impl Into<String>,
        options: RecordStoreOptions,
        table: RecordTable,
    ) -> StoreResult<Self> {
        options.validate()?;
        if options.log_typed != table.is_log_typed() {
            return Err(StoreError::invalid_config(format!(
                "log_typed = {} does not match shared table {}",
                options.log_typed,
                table.id()
            )));
        }
        Ok(Self::build(ns.into(), options, table))
    }

    fn build(ns: String, options: RecordStoreOptions, table: RecordTable) -> Self {
        Self {
            ns,
            table,
            capped: options.capped,
            capped_delete_hook: None,
            log_id_extractor: Arc::new(JsonTimestampExtractor),
        }
    }

    /// Install the hook invoked before each capped eviction
    pub fn with_capped_delete_hook(mut self, hook: Arc<dyn CappedDeleteHook>) -> Self {
        self.capped_delete_hook = Some(hook);
        self
    }

    /// Replace the log identifier extractor (defaults to JSON `ts`)
    pub fn with_log_id_extractor(mut self, extractor: Arc<dyn LogIdExtractor>) -> Self {
        self.log_id_extractor = extractor;
        self
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Engine name
    pub fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    /// Namespace this handle serves
    pub fn ns(&self) -> &str {
        &self.ns
    }

    /// Handle to the underlying table, for sharing with another store
    pub fn shared_table(&self) -> RecordTable {
        self.table.clone()
    }

    /// Whether the table is capped
    pub fn is_capped(&self) -> bool {
        self.capped.is_some()
    }

    /// Capped byte ceiling
    pub fn capped_max_size(&self) -> Option<u64> {
        self.capped.map(|c| c.max_bytes)
    }

    /// Capped document ceiling; `None` when uncapped or unbounded
    pub fn capped_max_docs(&self) -> Option<u64> {
        self.capped.and_then(|c| c.max_docs)
    }

    /// Whether identifiers come from log timestamps
    pub fn is_log_typed(&self) -> bool {
        self.table.is_log_typed()
    }

    /// Number of records
    pub fn num_records(&self) -> u64 {
        self.table.len() as u64
    }

    /// Sum of payload sizes
    pub fn data_size(&self) -> u64 {
        self.table.data_size()
    }

    /// Patch-based updates are always supported
    pub fn update_with_damages_supported(&self) -> bool {
        true
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Payload at `id`, if present
    pub fn find_record(&self, id: RecordId) -> Option<RecordData> {
        self.table.lookup(id)
    }

    /// Payload at `id`, which must exist
    pub fn data_for(&self, id: RecordId) -> RecordData {
        match self.table.lookup(id) {
            Some(data) => data,
            None => invariant_violation(format_args!(
                "{}: cannot find record for {}",
                self.ns, id
            )),
        }
    }

    /// Cursor over the table
    pub fn get_cursor(&self, direction: Direction) -> RecordCursor {
        RecordCursor::new(self.table.clone(), direction, self.is_capped())
    }

    /// Where a log reader should start to see everything after `target`
    ///
    /// - `None`: not a log-typed store
    /// - `Some(None)`: nothing at or below `target` (including an empty table)
    /// - `Some(Some(id))`: greatest id `<= target`; a null `target` yields
    ///   the table minimum
    pub fn start_position_for(&self, target: RecordId) -> Option<Option<RecordId>> {
        if !self.is_log_typed() {
            return None;
        }
        let data = self.table.read();
        if target.is_null() {
            return Some(data.records.keys().next().copied());
        }
        Some(data.records.range(..=target).next_back().map(|(id, _)| *id))
    }

    // ========================================================================
    // Inserts
    // ========================================================================

    /// Insert a copy of `payload`, returning its identifier
    ///
    /// # Errors
    ///
    /// - `ExceedsCapacity`: payload larger than the capped byte ceiling
    /// - `MalformedLogEntry` / `OutOfOrder`: log-typed identifier rejected
    /// - whatever the capped-delete hook returns while making room
    ///
    /// On a hook failure the insert itself has already happened and been
    /// journaled; the caller is expected to abort.
    pub fn insert_record(&self, txn: &mut dyn RecoveryUnit, payload: &[u8]) -> StoreResult<RecordId> {
        self.check_capacity(payload.len() as u64)?;
        self.insert_prepared(txn, RecordData::copy_from(payload))
    }

    /// Insert a document serialized by `writer` straight into the record buffer
    ///
    /// Same rules and errors as [`RecordStore::insert_record`].
    pub fn insert_record_with_writer(
        &self,
        txn: &mut dyn RecoveryUnit,
        writer: &dyn DocWriter,
    ) -> StoreResult<RecordId> {
        let len = writer.document_size();
        self.check_capacity(len as u64)?;
        let mut buf = vec![0u8; len];
        writer.write_document(&mut buf);
        self.insert_prepared(txn, RecordData::from(buf))
    }

    fn insert_prepared(&self, txn: &mut dyn RecoveryUnit, rec: RecordData) -> StoreResult<RecordId> {
        let id = if self.is_log_typed() {
            let candidate = self.log_id_extractor.extract(rec.as_bytes())?;
            self.table.accept_log_id(candidate)?
        } else {
            self.table.allocate_id()
        };

        self.table.insert(txn, id, rec);
        self.capped_delete_as_needed(txn)?;
        Ok(id)
    }

    // ========================================================================
    // Updates and Deletes
    // ========================================================================

    /// Replace the payload of an existing record
    ///
    /// The record must exist. `notifier` runs after the capped checks and
    /// before anything changes.
    ///
    /// # Errors
    ///
    /// - `ExceedsCapacity`: payload larger than the capped byte ceiling
    /// - `CappedGrowthNotAllowed`: payload larger than the current one in a
    ///   capped table
    /// - whatever the notifier or the capped-delete hook returns
    pub fn update_record(
        &self,
        txn: &mut dyn RecoveryUnit,
        id: RecordId,
        payload: &[u8],
        notifier: Option<&dyn UpdateNotifier>,
    ) -> StoreResult<RecordId> {
        let old = self.data_for(id);
        self.check_capped_update(id, old.size(), payload.len() as u64)?;

        if let Some(notifier) = notifier {
            notifier.going_to_update_in_place(id)?;
        }

        self.table.replace(txn, id, RecordData::copy_from(payload));
        self.capped_delete_as_needed(txn)?;
        Ok(id)
    }

    /// Delete an existing record
    ///
    /// The record must exist; use [`RecordStore::find_record`] first for a
    /// soft delete.
    pub fn delete_record(&self, txn: &mut dyn RecoveryUnit, id: RecordId) {
        self.table.remove(txn, id);
    }

    /// Remove every record
    ///
    /// Takes effect immediately; aborting the transaction brings the records
    /// back. The identifier allocator is not reset.
    pub fn truncate(&self, txn: &mut dyn RecoveryUnit) {
        debug!(
            target: "memrec::storage",
            ns = %self.ns,
            records = self.table.len(),
            "Truncating record store"
        );
        self.table.truncate(txn);
    }

    /// Remove every record after `end` (and `end` itself if `inclusive`)
    ///
    /// Each removal is journaled separately.
    pub fn capped_truncate_after(&self, txn: &mut dyn RecoveryUnit, end: RecordId, inclusive: bool) {
        let doomed: Vec<RecordId> = {
            let data = self.table.read();
            let tail = if inclusive {
                data.records.range(end..)
            } else {
                data.records
                    .range((std::ops::Bound::Excluded(end), std::ops::Bound::Unbounded))
            };
            tail.map(|(id, _)| *id).collect()
        };

        debug!(
            target: "memrec::storage",
            ns = %self.ns,
            end = %end,
            inclusive,
            removed = doomed.len(),
            "Truncating record store tail"
        );

        for id in doomed {
            self.table.remove(txn, id);
        }
    }

    // ========================================================================
    // Capped Checks
    // ========================================================================

    fn check_capacity(&self, size: u64) -> StoreResult<()> {
        match self.capped {
            Some(capped) if size > capped.max_bytes => Err(StoreError::ExceedsCapacity {
                size,
                max_bytes: capped.max_bytes,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_capped_update(&self, id: RecordId, old_size: u64, new_size: u64) -> StoreResult<()> {
        self.check_capacity(new_size)?;
        if self.is_capped() && new_size > old_size {
            return Err(StoreError::CappedGrowthNotAllowed {
                id,
                old_size,
                new_size,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("ns", &self.ns)
            .field("table", &self.table.id())
            .field("capped", &self.capped)
            .field("has_capped_delete_hook", &self.capped_delete_hook.is_some())
            .finish()
    }
}
