//! Size estimates and engine-specific statistics

use crate::store::RecordStore;
use memrec_core::invariant;
use memrec_core::{RecordData, RecordId};
use serde_json::{json, Map, Value};
use std::mem;

/// Fixed bookkeeping charged per record by [`RecordStore::storage_size_estimate`]
pub const RECORD_OVERHEAD_BYTES: u64 = (mem::size_of::<RecordId>() + mem::size_of::<RecordData>()) as u64;

impl RecordStore {
    /// Approximate memory held by the table: payload bytes plus a fixed
    /// overhead per record
    pub fn storage_size_estimate(&self) -> u64 {
        self.data_size() + self.num_records() * RECORD_OVERHEAD_BYTES
    }

    /// Add this engine's fields to a collection stats document
    ///
    /// Always adds `capped`. Capped stores also report `max` (document
    /// ceiling, `-1` when unbounded) and `maxSize` (byte ceiling divided by
    /// `scale`).
    ///
    /// # Arguments
    /// * `out` - Stats document being built
    /// * `scale` - Unit divisor for byte counts (1 = bytes, 1024 = KiB); must be non-zero
    pub fn append_custom_stats(&self, out: &mut Map<String, Value>, scale: u64) {
        invariant!(scale > 0, "stats scale must be positive");

        out.insert("capped".to_string(), Value::Bool(self.is_capped()));
        if let Some(capped) = self.capped {
            let max_docs = capped.max_docs.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
            out.insert("max".to_string(), json!(max_docs));
            out.insert("maxSize".to_string(), json!(capped.max_bytes / scale));
        }
    }
}
