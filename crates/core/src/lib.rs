//! Core types for memrec
//!
//! This crate defines the vocabulary shared by every other crate:
//! - RecordId / RecordData / Record: what the table stores
//! - LogTimestamp: the timestamp embedded in log-typed payloads
//! - StoreError: the recoverable error taxonomy
//! - RecordStoreOptions / CappedConfig: construction-time configuration
//! - Collaborator traits: capped-delete hooks, update notifiers, validators,
//!   payload writers and log identifier extraction
//! - invariant: the fatal path for programmer errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod invariant;
pub mod log_id;
pub mod traits;
pub mod types;

pub use config::{CappedConfig, RecordStoreOptions};
pub use error::{StoreError, StoreResult};
pub use log_id::JsonTimestampExtractor;
pub use traits::{CappedDeleteHook, DocWriter, LogIdExtractor, RecordValidator, UpdateNotifier};
pub use types::{LogTimestamp, Record, RecordData, RecordId};
