//! Transaction layer for memrec
//!
//! The storage crate only registers undo entries; this crate owns them.
//! - TransactionContext: numbered transaction collecting journal entries,
//!   committed or aborted exactly once
//! - WriteUnitOfWork: scoped guard that aborts unless committed

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod transaction;

pub use transaction::{TransactionContext, TransactionStatus, WriteUnitOfWork};
