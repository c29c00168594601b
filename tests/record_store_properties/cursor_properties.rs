//! Cursor save/restore against concurrent deletes

use crate::test_utils::*;
use memrec::{CursorState, Direction, RecordId, RecordStore, TransactionContext};
use proptest::prelude::*;

fn filled(store: &RecordStore, n: usize) -> Vec<RecordId> {
    let mut txn = TransactionContext::new();
    let ids = (0..n)
        .map(|i| store.insert_record(&mut txn, format!("row{}", i).as_bytes()).unwrap())
        .collect();
    txn.commit();
    ids
}

fn delete(store: &RecordStore, id: RecordId) {
    let mut txn = TransactionContext::new();
    store.delete_record(&mut txn, id);
    txn.commit();
}

proptest! {
    #[test]
    fn restore_after_delete_resumes_past_saved(
        n in 1usize..30,
        pick in any::<usize>(),
        extra_deletes in prop::collection::vec(any::<usize>(), 0..5),
    ) {
        let store = plain_store();
        let ids = filled(&store, n);
        let saved = ids[pick % n];

        let mut fwd = store.get_cursor(Direction::Forward);
        let mut rev = store.get_cursor(Direction::Reverse);
        prop_assert!(fwd.seek_exact(saved).is_some());
        prop_assert!(rev.seek_exact(saved).is_some());
        fwd.save();
        rev.save();

        delete(&store, saved);
        for d in extra_deletes {
            let live = live_ids(&store);
            if !live.is_empty() {
                delete(&store, live[d % live.len()]);
            }
        }
        let live = live_ids(&store);

        prop_assert!(fwd.restore());
        prop_assert!(rev.restore());

        let expected_fwd: Vec<RecordId> = live.iter().copied().filter(|id| *id > saved).collect();
        let mut expected_rev: Vec<RecordId> = live.iter().copied().filter(|id| *id < saved).collect();
        expected_rev.reverse();

        prop_assert_eq!(fwd.map(|rec| rec.id).collect::<Vec<_>>(), expected_fwd);
        prop_assert_eq!(rev.map(|rec| rec.id).collect::<Vec<_>>(), expected_rev);
    }

    #[test]
    fn restore_with_saved_present_continues_after_it(
        n in 1usize..30,
        pick in any::<usize>(),
        more in 0usize..5,
    ) {
        let store = plain_store();
        let ids = filled(&store, n);
        let saved = ids[pick % n];

        let mut fwd = store.get_cursor(Direction::Forward);
        fwd.seek_exact(saved);
        fwd.save();
        let added = filled(&store, more);
        prop_assert!(fwd.restore());
        prop_assert_eq!(fwd.state(), CursorState::Positioned(saved));

        let expected: Vec<RecordId> = ids
            .iter()
            .chain(added.iter())
            .copied()
            .filter(|id| *id > saved)
            .collect();
        prop_assert_eq!(fwd.map(|rec| rec.id).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn capped_restore_fails_when_saved_is_gone(n in 1usize..20, pick in any::<usize>()) {
        let store = capped_store(1 << 20, None);
        let ids = filled(&store, n);
        let saved = ids[pick % n];

        for direction in [Direction::Forward, Direction::Reverse] {
            let mut cursor = store.get_cursor(direction);
            prop_assert!(cursor.seek_exact(saved).is_some());
            cursor.save();
            prop_assert!(cursor.restore());
        }

        let mut fwd = store.get_cursor(Direction::Forward);
        let mut rev = store.get_cursor(Direction::Reverse);
        fwd.seek_exact(saved);
        rev.seek_exact(saved);
        fwd.save();
        rev.save();

        delete(&store, saved);
        prop_assert!(!fwd.restore());
        prop_assert!(!rev.restore());
    }
}

#[test]
fn capped_restore_fails_after_eviction() {
    let store = capped_store(1 << 20, Some(3));
    let ids = filled(&store, 3);

    let mut cursor = store.get_cursor(Direction::Forward);
    assert_eq!(cursor.advance().map(|rec| rec.id), Some(ids[0]));
    cursor.save();

    // Pushes ids[0] out
    filled(&store, 1);
    assert!(!cursor.restore());
}

#[test]
fn save_unpositioned_restores_to_end() {
    let store = plain_store();
    filled(&store, 4);

    let mut cursor = store.get_cursor(Direction::Forward);
    cursor.advance();
    cursor.save_unpositioned();
    assert!(cursor.restore());
    assert_eq!(cursor.state(), CursorState::AtEnd);
    assert!(cursor.advance().is_none());
}

#[test]
fn readers_share_table_across_threads() {
    let store = plain_store();
    let ids = filled(&store, 100);

    std::thread::scope(|s| {
        for direction in [Direction::Forward, Direction::Reverse] {
            let store = &store;
            let ids = &ids;
            s.spawn(move || {
                let mut seen: Vec<RecordId> = store.get_cursor(direction).map(|rec| rec.id).collect();
                if direction == Direction::Reverse {
                    seen.reverse();
                }
                assert_eq!(&seen, ids);
            });
        }
    });
}
