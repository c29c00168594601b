//! Transaction contexts
//!
//! A [`TransactionContext`] is the [`RecoveryUnit`] mutations register their
//! undo entries with. Because the store mutates eagerly, the context never
//! applies anything on commit: it only decides what happens to the entries.
//!
//! - `commit()`: every entry is discarded, oldest first
//! - `abort()`: every entry is rolled back, newest first
//!
//! Either may happen once. Registering on, committing or aborting a finished
//! transaction is a caller bug.

use memrec_core::invariant;
use memrec_storage::{JournalEntry, RecoveryUnit};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepting changes
    Active,
    /// Changes kept
    Committed,
    /// Changes reversed
    Aborted,
}

/// A transaction's journal and status
pub struct TransactionContext {
    txn_id: u64,
    status: TransactionStatus,
    journal: Vec<JournalEntry>,
}

impl TransactionContext {
    /// Start a transaction with the next process-wide id
    pub fn new() -> Self {
        Self {
            txn_id: NEXT_TXN_ID.fetch_add(1, Ordering::Relaxed),
            status: TransactionStatus::Active,
            journal: Vec::new(),
        }
    }

    /// Transaction id; strictly increasing in creation order
    pub fn txn_id(&self) -> u64 {
        self.txn_id
    }

    /// Current status
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Whether changes may still be registered
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Entries registered so far
    pub fn pending_changes(&self) -> usize {
        self.journal.len()
    }

    /// Keep every change
    pub fn commit(&mut self) {
        self.ensure_active("commit");
        let changes = self.journal.len();
        for entry in self.journal.drain(..) {
            entry.commit();
        }
        self.status = TransactionStatus::Committed;
        debug!(target: "memrec::txn", txn_id = self.txn_id, changes, "Committed transaction");
    }

    /// Reverse every change, newest first
    pub fn abort(&mut self) {
        self.ensure_active("abort");
        let changes = self.journal.len();
        while let Some(entry) = self.journal.pop() {
            entry.rollback();
        }
        self.status = TransactionStatus::Aborted;
        debug!(target: "memrec::txn", txn_id = self.txn_id, changes, "Aborted transaction");
    }

    fn ensure_active(&self, op: &str) {
        invariant!(
            self.is_active(),
            "cannot {} transaction {}: already {:?}",
            op,
            self.txn_id,
            self.status
        );
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryUnit for TransactionContext {
    fn register_undo(&mut self, entry: JournalEntry) {
        self.ensure_active("register a change on");
        self.journal.push(entry);
    }
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("txn_id", &self.txn_id)
            .field("status", &self.status)
            .field("pending_changes", &self.journal.len())
            .finish()
    }
}

/// Scoped write guard over a transaction
///
/// If dropped without calling `commit()`, the transaction is aborted.
///
/// ```
/// use memrec_concurrency::{TransactionContext, TransactionStatus, WriteUnitOfWork};
/// use memrec_core::RecordStoreOptions;
/// use memrec_storage::RecordStore;
///
/// let store = RecordStore::new("app.items", RecordStoreOptions::new()).unwrap();
/// let mut txn = TransactionContext::new();
/// {
///     let mut wuow = WriteUnitOfWork::new(&mut txn);
///     store.insert_record(&mut wuow, b"draft").unwrap();
///     // dropped without commit
/// }
/// assert_eq!(txn.status(), TransactionStatus::Aborted);
/// assert_eq!(store.num_records(), 0);
/// ```
pub struct WriteUnitOfWork<'a> {
    txn: &'a mut TransactionContext,
    finished: bool,
}

impl<'a> WriteUnitOfWork<'a> {
    /// Open a unit of work on an active transaction
    pub fn new(txn: &'a mut TransactionContext) -> Self {
        txn.ensure_active("open a unit of work on");
        Self {
            txn,
            finished: false,
        }
    }

    /// Id of the underlying transaction
    pub fn txn_id(&self) -> u64 {
        self.txn.txn_id()
    }

    /// Commit the transaction
    pub fn commit(mut self) {
        self.txn.commit();
        self.finished = true;
    }

    /// Abort the transaction explicitly
    pub fn abort(mut self) {
        self.txn.abort();
        self.finished = true;
    }
}

impl RecoveryUnit for WriteUnitOfWork<'_> {
    fn register_undo(&mut self, entry: JournalEntry) {
        self.txn.register_undo(entry);
    }
}

impl Drop for WriteUnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.finished && self.txn.is_active() {
            self.txn.abort();
        }
    }
}
