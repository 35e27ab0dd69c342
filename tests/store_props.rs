//! Property tests for the indexed stores.
//!
//! After any sequence of adds and removes:
//!
//! 1. the slot maps agree with the dense arrays (`check_invariants`)
//! 2. every live key still resolves to the value last written for it
//! 3. cascading removals leave nothing behind for the removed key

use std::collections::HashMap;

use cellforge::{Id, IndexedStore, JoinStore, ManyStore, UniqueStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize, u32),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..16, any::<u32>()).prop_map(|(k, v)| Op::Add(k, v)),
        (0usize..16).prop_map(Op::Remove),
    ]
}

fn ids(n: usize) -> Vec<Id> {
    (0..n).map(|_| Id::next()).collect()
}

proptest! {
    #[test]
    fn unique_store_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let keys = ids(16);
        let mut store = UniqueStore::new();
        let mut model: HashMap<Id, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Add(k, v) => {
                    store.add(keys[k], v);
                    model.insert(keys[k], v);
                }
                Op::Remove(k) => {
                    let removed = store.remove(keys[k]).ok();
                    prop_assert_eq!(removed, model.remove(&keys[k]));
                }
            }
            prop_assert!(store.check_invariants().is_ok());
            prop_assert_eq!(store.len(), model.len());
        }
        for (id, v) in &model {
            prop_assert_eq!(store.get(*id).ok(), Some(v));
        }
    }

    #[test]
    fn many_store_cascade_leaves_nothing(
        children in prop::collection::vec((0usize..4, any::<u16>()), 0..64),
        doomed in 0usize..4,
    ) {
        let parents = ids(4);
        let mut store = ManyStore::new();
        for (p, v) in &children {
            store.add(parents[*p], *v);
        }
        let expected = children.iter().filter(|(p, _)| *p == doomed).count();

        prop_assert_eq!(store.remove_children(parents[doomed]).ok(), Some(expected));
        prop_assert!(store.children(parents[doomed]).is_empty());
        prop_assert_eq!(store.values_of(parents[doomed]).count(), 0);
        prop_assert_eq!(store.len(), children.len() - expected);
        prop_assert!(store.check_invariants().is_ok());

        for (i, parent) in parents.iter().enumerate().filter(|(i, _)| *i != doomed) {
            let kept: Vec<u16> = store.values_of(*parent).map(|(_, v)| *v).collect();
            let want: Vec<u16> = children.iter().filter(|(p, _)| *p == i).map(|(_, v)| *v).collect();
            prop_assert_eq!(kept, want);
        }
    }

    #[test]
    fn many_store_child_removal_keeps_siblings(
        children in prop::collection::vec(any::<u16>(), 1..32),
        pick in any::<prop::sample::Index>(),
    ) {
        let parent = Id::next();
        let mut store = ManyStore::new();
        let child_ids: Vec<Id> = children.iter().map(|v| store.add(parent, *v)).collect();

        let victim = pick.index(child_ids.len());
        prop_assert_eq!(store.remove(child_ids[victim]).ok(), Some(children[victim]));
        prop_assert!(store.check_invariants().is_ok());

        let mut want = children.clone();
        want.remove(victim);
        let kept: Vec<u16> = store.values_of(parent).map(|(_, v)| *v).collect();
        prop_assert_eq!(kept, want);
    }

    #[test]
    fn join_bulk_delete_is_exact(
        pairs in prop::collection::vec((0usize..6, 0usize..3), 0..40),
        region in 0usize..6,
        ion in 0usize..3,
    ) {
        let regions = ids(6);
        let ions = ids(3);
        let mut store = JoinStore::new();
        for (r, i) in &pairs {
            store.add(regions[*r], ions[*i], ());
        }

        prop_assert!(store.remove_by_first(regions[region]).is_ok());
        prop_assert!(store.check_invariants().is_ok());
        prop_assert!(store.iter().all(|((a, _), _)| a != regions[region]));
        for (r, i) in &pairs {
            if *r != region {
                prop_assert!(store.contains((regions[*r], ions[*i])));
            }
        }

        prop_assert!(store.remove_by_second(ions[ion]).is_ok());
        prop_assert!(store.check_invariants().is_ok());
        prop_assert!(store.iter().all(|((_, b), _)| b != ions[ion]));
        for (r, i) in &pairs {
            if *r != region && *i != ion {
                prop_assert!(store.contains((regions[*r], ions[*i])));
            }
        }
    }
}
