//! Collaborator traits
//!
//! These are the seams where code outside the record store plugs in:
//!
//! | Trait | Called |
//! |-------|--------|
//! | [`CappedDeleteHook`] | before each capped eviction |
//! | [`UpdateNotifier`] | before a record is replaced in place |
//! | [`RecordValidator`] | per record during a full validation scan |
//! | [`DocWriter`] | to serialize a payload straight into a new record |
//! | [`LogIdExtractor`] | to derive a log-typed record's identifier |
//!
//! Hooks and notifiers may fail; their error is propagated unchanged and
//! stops the operation that invoked them.
//!
//! Plain closures implement the hook, notifier and validator traits.

use crate::error::StoreResult;
use crate::types::{RecordData, RecordId};

/// Invoked before a capped table evicts its oldest record
pub trait CappedDeleteHook: Send + Sync {
    /// About to delete `id`, whose current payload is `data`
    fn about_to_delete_capped(&self, id: RecordId, data: &RecordData) -> StoreResult<()>;
}

impl<F> CappedDeleteHook for F
where
    F: Fn(RecordId, &RecordData) -> StoreResult<()> + Send + Sync,
{
    fn about_to_delete_capped(&self, id: RecordId, data: &RecordData) -> StoreResult<()> {
        self(id, data)
    }
}

/// Invoked before a record's payload is replaced
pub trait UpdateNotifier {
    /// About to update `id` in place
    fn going_to_update_in_place(&self, id: RecordId) -> StoreResult<()>;
}

impl<F> UpdateNotifier for F
where
    F: Fn(RecordId) -> StoreResult<()>,
{
    fn going_to_update_in_place(&self, id: RecordId) -> StoreResult<()> {
        self(id)
    }
}

/// Checks a single payload during validation
pub trait RecordValidator {
    /// `Err(reason)` if the payload is invalid
    fn validate(&self, id: RecordId, data: &RecordData) -> Result<(), String>;
}

impl<F> RecordValidator for F
where
    F: Fn(RecordId, &RecordData) -> Result<(), String>,
{
    fn validate(&self, id: RecordId, data: &RecordData) -> Result<(), String> {
        self(id, data)
    }
}

/// Writes a document directly into a freshly allocated record buffer
pub trait DocWriter {
    /// Exact number of bytes `write_document` will fill
    fn document_size(&self) -> usize;

    /// Fill `buf`, which is exactly `document_size()` bytes long
    fn write_document(&self, buf: &mut [u8]);
}

/// Derives the identifier of a log-typed record from its payload
pub trait LogIdExtractor: Send + Sync {
    /// Identifier for `payload`, or `MalformedLogEntry`
    fn extract(&self, payload: &[u8]) -> StoreResult<RecordId>;
}
