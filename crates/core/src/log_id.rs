//! Log identifier extraction for JSON payloads
//!
//! Log-typed payloads are JSON objects with a `ts` field holding a
//! [`LogTimestamp`]:
//!
//! ```json
//! {"ts": {"t": 1700000000, "i": 1}, "op": "i", "o": {"_id": 1}}
//! ```
//!
//! The record identifier is the timestamp's encoding, so replaying records
//! in identifier order replays them in the order their source assigned.

use crate::error::{StoreError, StoreResult};
use crate::traits::LogIdExtractor;
use crate::types::{LogTimestamp, RecordId};
use serde::Deserialize;

/// Field holding the timestamp
pub const TIMESTAMP_FIELD: &str = "ts";

/// Default [`LogIdExtractor`]: reads `ts` from a JSON object payload
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTimestampExtractor;

impl JsonTimestampExtractor {
    /// Parse the timestamp out of `payload`
    pub fn timestamp_of(payload: &[u8]) -> StoreResult<LogTimestamp> {
        let doc: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| StoreError::malformed(format!("payload is not JSON: {}", e)))?;

        let obj = doc
            .as_object()
            .ok_or_else(|| StoreError::malformed("payload is not a JSON object"))?;

        let field = obj
            .get(TIMESTAMP_FIELD)
            .ok_or_else(|| StoreError::malformed("no ts field"))?;

        let ts = LogTimestamp::deserialize(field)
            .map_err(|_| StoreError::malformed("ts field is not a timestamp"))?;

        if !ts.is_encodable() {
            return Err(StoreError::malformed(format!("{} secs or inc too high", ts)));
        }
        if ts.is_null() {
            return Err(StoreError::malformed("ts is the null timestamp"));
        }
        Ok(ts)
    }
}

impl LogIdExtractor for JsonTimestampExtractor {
    fn extract(&self, payload: &[u8]) -> StoreResult<RecordId> {
        Self::timestamp_of(payload).map(LogTimestamp::to_record_id)
    }
}

/// Build a minimal log payload carrying `ts`
///
/// Handy for callers and tests that only care about ordering.
pub fn log_payload(ts: LogTimestamp, body: serde_json::Value) -> Vec<u8> {
    let doc = serde_json::json!({ "ts": ts, "o": body });
    doc.to_string().into_bytes()
}
