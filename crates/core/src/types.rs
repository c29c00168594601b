//! Record identifiers and payloads
//!
//! - RecordId: ordered key addressing one record within a table
//! - RecordData: immutable, cheaply clonable payload bytes
//! - Record: an (id, payload) pair as handed out by cursors
//! - LogTimestamp: (seconds, increment) pair that log-typed records are keyed by

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Ordered identifier of a record within one table
///
/// `RecordId::NULL` is never stored; it stands for "no position" in cursor
/// save state and in start-position lookups.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// The null identifier
    pub const NULL: RecordId = RecordId(0);
    /// Smallest identifier a record can have
    pub const MIN: RecordId = RecordId(1);
    /// Upper bound; the allocator never hands this out
    pub const MAX: RecordId = RecordId(u64::MAX);

    /// Wrap a raw value
    pub const fn new(raw: u64) -> Self {
        RecordId(raw)
    }

    /// Raw value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// True for `RecordId::NULL`
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// True if this id may address a stored record
    pub const fn is_normal(self) -> bool {
        self.0 >= Self::MIN.0 && self.0 < Self::MAX.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(raw: u64) -> Self {
        RecordId(raw)
    }
}

impl From<LogTimestamp> for RecordId {
    fn from(ts: LogTimestamp) -> Self {
        ts.to_record_id()
    }
}

/// Owned record payload
///
/// Backed by an `Arc<[u8]>`, so journal entries and cursors can hold on to a
/// payload without copying it. Payloads are never mutated in place; updates
/// build a new `RecordData` and swap it into the table.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecordData(Arc<[u8]>);

impl RecordData {
    /// Copy `bytes` into a new payload
    pub fn copy_from(bytes: &[u8]) -> Self {
        RecordData(Arc::from(bytes))
    }

    /// Payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size in bytes; this is what the table's byte counter tracks
    pub fn size(&self) -> u64 {
        self.0.len() as u64
    }

    /// Copy the payload out into a `Vec`
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordData")
            .field("size", &self.0.len())
            .finish()
    }
}

impl Deref for RecordData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for RecordData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RecordData {
    fn from(bytes: Vec<u8>) -> Self {
        RecordData(Arc::from(bytes))
    }
}

impl From<&[u8]> for RecordData {
    fn from(bytes: &[u8]) -> Self {
        RecordData::copy_from(bytes)
    }
}

/// A record as returned by cursors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identifier
    pub id: RecordId,
    /// Payload
    pub data: RecordData,
}

impl Record {
    /// Build a record
    pub fn new(id: RecordId, data: RecordData) -> Self {
        Self { id, data }
    }
}

/// Timestamp carried by log-typed payloads
///
/// Ordered by seconds, then increment, which is exactly the order of the
/// derived `RecordId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogTimestamp {
    /// Seconds since the Unix epoch
    #[serde(rename = "t")]
    pub secs: u32,
    /// Ordinal within the second
    #[serde(rename = "i")]
    pub inc: u32,
}

impl LogTimestamp {
    /// Build a timestamp
    pub const fn new(secs: u32, inc: u32) -> Self {
        Self { secs, inc }
    }

    /// Build a timestamp from a wall-clock instant
    ///
    /// Returns `None` for instants before the epoch or past what the
    /// identifier encoding can carry.
    pub fn from_datetime(at: DateTime<Utc>, inc: u32) -> Option<Self> {
        let secs = u32::try_from(at.timestamp()).ok()?;
        let ts = Self::new(secs, inc);
        ts.is_encodable().then_some(ts)
    }

    /// True if both components fit the identifier encoding
    pub fn is_encodable(&self) -> bool {
        self.secs <= i32::MAX as u32 && self.inc <= i32::MAX as u32
    }

    /// The null timestamp `(0, 0)`
    pub fn is_null(&self) -> bool {
        self.secs == 0 && self.inc == 0
    }

    /// Identifier for this timestamp: `(secs << 32) | inc`
    pub fn to_record_id(self) -> RecordId {
        RecordId::new((u64::from(self.secs) << 32) | u64::from(self.inc))
    }

    /// Inverse of [`LogTimestamp::to_record_id`]
    pub fn from_record_id(id: RecordId) -> Self {
        let raw = id.as_u64();
        Self::new((raw >> 32) as u32, raw as u32)
    }
}

impl fmt::Display for LogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}, {})", self.secs, self.inc)
    }
}
