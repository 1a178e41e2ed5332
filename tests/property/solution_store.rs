//! Every known solution lives in exactly one collection, and re-adding known
//! ids never changes the store.

use proptest::prelude::*;
use scout::solution::{Collection, Solution, SolutionStore};
use scout::types::SolutionId;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add(Vec<u8>),
    Save(u8),
    Trash(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(0u8..16, 0..5).prop_map(Op::Add),
        (0u8..16).prop_map(Op::Save),
        (0u8..16).prop_map(Op::Trash),
    ]
}

fn id(n: u8) -> SolutionId {
    SolutionId::from(n as u64)
}

fn ids_of(list: &[Solution]) -> Vec<SolutionId> {
    list.iter().map(|s| s.id().clone()).collect()
}

#[test]
fn test_membership_is_exclusive() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(op_strategy(), 0..30), |ops| {
            let mut store = SolutionStore::new();
            for op in ops {
                match op {
                    Op::Add(ns) => {
                        store.add_pending(ns.into_iter().map(|n| Solution::new(id(n), vec![])).collect());
                    }
                    Op::Save(n) => {
                        let was_pending = store.collection_of(&id(n)) == Some(Collection::Pending);
                        prop_assert_eq!(store.move_to_saved(&id(n)).is_ok(), was_pending);
                    }
                    Op::Trash(n) => {
                        let was_pending = store.collection_of(&id(n)) == Some(Collection::Pending);
                        prop_assert_eq!(store.move_to_trashed(&id(n)).is_ok(), was_pending);
                    }
                }
            }

            let mut seen = HashSet::new();
            for (collection, list) in [
                (Collection::Pending, store.pending()),
                (Collection::Saved, store.saved()),
                (Collection::Trashed, store.trashed()),
            ] {
                for solution in list {
                    prop_assert!(seen.insert(solution.id().clone()));
                    prop_assert_eq!(store.collection_of(solution.id()), Some(collection));
                }
            }
            prop_assert_eq!(seen.len(), store.len());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_re_adding_known_ids_is_a_noop() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(0u8..10, 1..10), |ns| {
            let mut store = SolutionStore::new();
            store.add_pending(ns.iter().map(|n| Solution::new(id(*n), vec![])).collect());
            let pending = ids_of(store.pending());

            let added = store.add_pending(ns.iter().map(|n| Solution::new(id(*n), vec![])).collect());
            prop_assert!(added.is_empty());
            prop_assert_eq!(ids_of(store.pending()), pending);
            Ok(())
        })
        .unwrap();
}
