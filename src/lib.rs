//! memrec: transactional in-memory record store
//!
//! Records are opaque byte payloads keyed by a 64-bit [`RecordId`], kept in
//! identifier order. Every mutation applies immediately and registers an
//! undo entry with the caller's transaction, so aborting restores the table
//! exactly. Tables may be capped (FIFO eviction by identifier) and
//! log-typed (identifiers taken from a timestamp in the payload).
//!
//! # Example
//!
//! ```
//! use memrec::{Direction, RecordStore, RecordStoreOptions, TransactionContext, WriteUnitOfWork};
//!
//! let store = RecordStore::new("app.notes", RecordStoreOptions::new()).unwrap();
//!
//! let mut txn = TransactionContext::new();
//! let mut wuow = WriteUnitOfWork::new(&mut txn);
//! let id = store.insert_record(&mut wuow, b"hello").unwrap();
//! wuow.commit();
//!
//! let mut cursor = store.get_cursor(Direction::Forward);
//! assert_eq!(cursor.advance().map(|rec| rec.id), Some(id));
//! ```
//!
//! # Crates
//!
//! - `memrec-core`: identifiers, payloads, errors, configuration, collaborator traits
//! - `memrec-storage`: the table, journal entries, store handle and cursors
//! - `memrec-concurrency`: transaction contexts and write units

#![warn(missing_docs)]
#![warn(clippy::all)]

mod types;

pub use types::*;
