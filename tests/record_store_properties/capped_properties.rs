//! Capped ceilings and FIFO eviction

use crate::test_utils::*;
use memrec::{
    CappedDeleteHook, RecordData, RecordId, StoreError, StoreResult, TransactionContext,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

const MAX_BYTES: u64 = 96;

fn fits(sizes: &[u64], max_docs: Option<u64>) -> bool {
    let total: u64 = sizes.iter().sum();
    total <= MAX_BYTES && max_docs.map_or(true, |n| sizes.len() as u64 <= n)
}

proptest! {
    #[test]
    fn ceilings_hold_and_eviction_is_minimal_fifo(
        sizes in prop::collection::vec(1usize..=48, 1..60),
        max_docs in prop::option::of(1u64..8),
    ) {
        let store = capped_store(MAX_BYTES, max_docs);
        // (id, size) of every record the model believes is live
        let mut model: Vec<(RecordId, u64)> = Vec::new();

        let mut txn = TransactionContext::new();
        for size in sizes {
            let id = store.insert_record(&mut txn, &vec![b'x'; size]).unwrap();
            model.push((id, size as u64));

            // Drop from the front only while over a ceiling
            while !fits(&model.iter().map(|(_, s)| *s).collect::<Vec<_>>(), max_docs) {
                model.remove(0);
            }

            prop_assert!(store.data_size() <= MAX_BYTES);
            if let Some(n) = max_docs {
                prop_assert!(store.num_records() <= n);
            }
            let expected: Vec<RecordId> = model.iter().map(|(id, _)| *id).collect();
            prop_assert_eq!(live_ids(&store), expected);
        }
        txn.commit();
    }

    #[test]
    fn oversized_payload_never_evicts(
        seed in prop::collection::vec(1usize..=16, 0..6),
        extra in 1usize..32,
    ) {
        let store = capped_store(MAX_BYTES, None);
        let mut txn = TransactionContext::new();
        for size in &seed {
            store.insert_record(&mut txn, &vec![b's'; *size]).unwrap();
        }
        let before = store.shared_table().snapshot();

        let err = store
            .insert_record(&mut txn, &vec![b'o'; MAX_BYTES as usize + extra])
            .unwrap_err();
        prop_assert_eq!(err.code(), "ExceedsCapacity");
        prop_assert_eq!(store.shared_table().snapshot(), before);
        txn.commit();
    }
}

struct Recorder(Mutex<Vec<RecordId>>);

impl CappedDeleteHook for Recorder {
    fn about_to_delete_capped(&self, id: RecordId, _data: &RecordData) -> StoreResult<()> {
        self.0.lock().unwrap().push(id);
        Ok(())
    }
}

#[test]
fn hook_sees_evictions_oldest_first() {
    let hook = Arc::new(Recorder(Mutex::new(Vec::new())));
    let store = capped_store(1_000, Some(3)).with_capped_delete_hook(hook.clone());

    let mut txn = TransactionContext::new();
    let ids: Vec<RecordId> = (0..8)
        .map(|_| store.insert_record(&mut txn, b"entry").unwrap())
        .collect();
    txn.commit();

    assert_eq!(*hook.0.lock().unwrap(), ids[..5].to_vec());
    assert_eq!(live_ids(&store), ids[5..].to_vec());
}

#[test]
fn abort_brings_back_evicted_records() {
    let store = capped_store(1_000, Some(2));
    let mut setup = TransactionContext::new();
    let a = store.insert_record(&mut setup, b"a").unwrap();
    let b = store.insert_record(&mut setup, b"b").unwrap();
    setup.commit();

    let mut txn = TransactionContext::new();
    store.insert_record(&mut txn, b"c").unwrap();
    store.insert_record(&mut txn, b"d").unwrap();
    assert_eq!(store.num_records(), 2);
    txn.abort();

    assert_eq!(live_ids(&store), vec![a, b]);
}

struct RefuseOne(RecordId);

impl CappedDeleteHook for RefuseOne {
    fn about_to_delete_capped(&self, id: RecordId, _data: &RecordData) -> StoreResult<()> {
        if id == self.0 {
            return Err(StoreError::hook("capped delete", format!("{} is pinned", id)));
        }
        Ok(())
    }
}

#[test]
fn abort_after_hook_failure_mid_eviction() {
    let store = capped_store(3, None).with_capped_delete_hook(Arc::new(RefuseOne(RecordId::new(2))));
    let mut setup = TransactionContext::new();
    for payload in [&b"a"[..], b"b", b"c"] {
        store.insert_record(&mut setup, payload).unwrap();
    }
    setup.commit();
    let before = store.shared_table().snapshot();

    let mut txn = TransactionContext::new();
    let err = store.insert_record(&mut txn, b"dd").unwrap_err();
    assert_eq!(err.code(), "HookFailed");
    // Partially evicted: 1 is gone, 2 was refused
    assert_eq!(
        live_ids(&store),
        vec![RecordId::new(2), RecordId::new(3), RecordId::new(4)]
    );

    txn.abort();
    assert_eq!(store.shared_table().snapshot(), before);
}
