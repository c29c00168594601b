//! Log-typed identifier ordering

use crate::test_utils::*;
use memrec::{log_payload, LogTimestamp, RecordId, StoreError, TransactionContext};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn accepted_exactly_when_strictly_increasing(
        stamps in prop::collection::vec((1u32..6, 1u32..6), 1..40),
    ) {
        let store = log_store();
        let mut txn = TransactionContext::new();
        let mut highest: Option<RecordId> = None;
        let mut accepted = Vec::new();

        for (secs, inc) in stamps {
            let ts = LogTimestamp::new(secs, inc);
            let candidate = ts.to_record_id();
            let result = store.insert_record(&mut txn, &log_payload(ts, json!({"n": inc})));

            match highest {
                Some(max) if candidate <= max => {
                    prop_assert_eq!(
                        result,
                        Err(StoreError::OutOfOrder { candidate, highest: max })
                    );
                }
                _ => {
                    prop_assert_eq!(result, Ok(candidate));
                    highest = Some(candidate);
                    accepted.push(candidate);
                }
            }
        }

        prop_assert!(accepted.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(live_ids(&store), accepted);
        txn.commit();
    }

    #[test]
    fn start_position_is_greatest_at_or_below(
        secs in prop::collection::btree_set(1u32..50, 1..12),
        target in 0u32..60,
    ) {
        let store = log_store();
        let mut txn = TransactionContext::new();
        for s in &secs {
            store.insert_record(&mut txn, &log_payload(LogTimestamp::new(*s, 1), json!({}))).unwrap();
        }
        txn.commit();

        let target_id = LogTimestamp::new(target, 1).to_record_id();
        let expected = secs
            .iter()
            .rev()
            .find(|s| **s <= target)
            .map(|s| LogTimestamp::new(*s, 1).to_record_id());
        prop_assert_eq!(store.start_position_for(target_id), Some(expected));
    }
}

#[test]
fn null_target_starts_at_minimum() {
    let store = log_store();
    let mut txn = TransactionContext::new();
    assert_eq!(store.start_position_for(RecordId::NULL), Some(None));

    for secs in [4, 9] {
        store
            .insert_record(&mut txn, &log_payload(LogTimestamp::new(secs, 0), json!({})))
            .unwrap();
    }
    txn.commit();

    assert_eq!(
        store.start_position_for(RecordId::NULL),
        Some(Some(LogTimestamp::new(4, 0).to_record_id()))
    );
}

#[test]
fn malformed_payload_rejected_without_mutation() {
    let store = log_store();
    let mut txn = TransactionContext::new();
    for payload in [&b"not json"[..], br#"{"ts": 5}"#, br#"{"ts": {"t": 0, "i": 0}}"#] {
        let err = store.insert_record(&mut txn, payload).unwrap_err();
        assert_eq!(err.code(), "MalformedLogEntry");
    }
    assert_eq!(txn.pending_changes(), 0);
    assert_eq!(store.num_records(), 0);
    txn.commit();
}
