//! Fixed walkthroughs

use crate::test_utils::*;
use memrec::{
    Direction, JournalEntry, Patch, RecordCursor, RecordData, RecordId, RecordTable,
    StatsDocument, TransactionContext, WriteUnitOfWork,
};
use serde_json::json;

#[test]
fn capped_two_docs_keeps_newest_two() {
    let store = capped_store(1 << 20, Some(2));
    let mut txn = TransactionContext::new();
    for payload in [&b"1"[..], b"2", b"3"] {
        store.insert_record(&mut txn, payload).unwrap();
    }
    txn.commit();

    assert_eq!(live_ids(&store), vec![RecordId::new(2), RecordId::new(3)]);
    assert_eq!(store.num_records(), 2);
}

#[test]
fn restore_after_insert_keeps_exact_position() {
    let table = RecordTable::new(false);
    let mut journal: Vec<JournalEntry> = Vec::new();
    table.insert(&mut journal, RecordId::new(5), RecordData::copy_from(b"abc"));

    let mut cursor = RecordCursor::new(table.clone(), Direction::Forward, false);
    assert_eq!(cursor.seek_exact(RecordId::new(5)).unwrap().data.as_bytes(), b"abc");
    cursor.save();

    table.insert(&mut journal, RecordId::new(6), RecordData::copy_from(b"def"));
    assert!(cursor.restore());
    assert_eq!(cursor.current(), Some(RecordId::new(5)));

    let next = cursor.advance().unwrap();
    assert_eq!(next.id, RecordId::new(6));
    assert_eq!(next.data.as_bytes(), b"def");
}

#[test]
fn patched_update_inside_unit_of_work() {
    let store = plain_store();
    let mut setup = TransactionContext::new();
    let id = store.insert_record(&mut setup, b"status=pending").unwrap();
    setup.commit();

    let mut txn = TransactionContext::new();
    let mut wuow = WriteUnitOfWork::new(&mut txn);
    let base = store.data_for(id);
    let patched = store
        .apply_patches(&mut wuow, id, &base, b"done!!!", &[Patch::new(0, 7, 7)], None)
        .unwrap();
    wuow.commit();

    assert_eq!(patched.as_bytes(), b"status=done!!!");
    assert_eq!(store.data_for(id).as_bytes(), b"status=done!!!");
}

#[test]
fn stats_and_validation_report() {
    let store = capped_store(2048, Some(16));
    let mut txn = TransactionContext::new();
    for payload in [&b"alpha"[..], b"beta", b"gamma"] {
        store.insert_record(&mut txn, payload).unwrap();
    }
    txn.commit();

    let mut stats = StatsDocument::new();
    store.append_custom_stats(&mut stats, 1024);
    assert_eq!(serde_json::Value::Object(stats), json!({"capped": true, "max": 16, "maxSize": 2}));

    let results = store.validate(true, None);
    assert!(results.is_valid());
    assert_eq!(results.record_count, 3);
    assert!(store.storage_size_estimate() > store.data_size());
}

#[test]
fn renamed_handle_sees_same_records() {
    let store = plain_store();
    let mut txn = TransactionContext::new();
    let id = store.insert_record(&mut txn, b"moved").unwrap();
    txn.commit();

    let renamed = memrec::RecordStore::with_shared_table(
        "props.renamed",
        memrec::RecordStoreOptions::new(),
        store.shared_table(),
    )
    .unwrap();
    assert_eq!(renamed.data_for(id).as_bytes(), b"moved");
    assert_eq!(renamed.ns(), "props.renamed");
    // Both stores plus the handle held here
    let table = store.shared_table();
    assert!(table.same_table(&renamed.shared_table()));
    assert_eq!(table.handle_count(), 3);
}
