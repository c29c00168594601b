//! Shared helpers for the property suite

use memrec::{
    CappedConfig, Direction, RecordId, RecordStore, RecordStoreOptions, RecoveryUnit,
};
use proptest::prelude::*;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route store logs to the test harness; safe to call from every test
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn plain_store() -> RecordStore {
    init_tracing();
    RecordStore::new("props.plain", RecordStoreOptions::new()).unwrap()
}

pub fn capped_store(max_bytes: u64, max_docs: Option<u64>) -> RecordStore {
    init_tracing();
    let mut capped = CappedConfig::new(max_bytes);
    capped.max_docs = max_docs;
    RecordStore::new("props.capped", RecordStoreOptions::new().capped(capped)).unwrap()
}

pub fn log_store() -> RecordStore {
    init_tracing();
    RecordStore::new("props.oplog", RecordStoreOptions::new().log_typed(true)).unwrap()
}

pub fn live_ids(store: &RecordStore) -> Vec<RecordId> {
    store
        .get_cursor(Direction::Forward)
        .map(|rec| rec.id)
        .collect()
}

/// A mutation against whatever records exist when it runs
#[derive(Debug, Clone)]
pub enum Op {
    Insert(Vec<u8>),
    Update(usize, Vec<u8>),
    Delete(usize),
    Truncate,
}

pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..24)
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => payload_strategy().prop_map(Op::Insert),
        3 => (any::<usize>(), payload_strategy()).prop_map(|(i, p)| Op::Update(i, p)),
        2 => any::<usize>().prop_map(Op::Delete),
        1 => Just(Op::Truncate),
    ]
}

/// Apply `op`; updates and deletes pick a live record by index and are
/// skipped on an empty table. Returns the id inserted, if any.
pub fn apply(store: &RecordStore, txn: &mut dyn RecoveryUnit, op: &Op) -> Option<RecordId> {
    let ids = live_ids(store);
    match op {
        Op::Insert(payload) => Some(store.insert_record(txn, payload).unwrap()),
        Op::Update(i, payload) if !ids.is_empty() => {
            store
                .update_record(txn, ids[i % ids.len()], payload, None)
                .unwrap();
            None
        }
        Op::Delete(i) if !ids.is_empty() => {
            store.delete_record(txn, ids[i % ids.len()]);
            None
        }
        Op::Truncate => {
            store.truncate(txn);
            None
        }
        _ => None,
    }
}
