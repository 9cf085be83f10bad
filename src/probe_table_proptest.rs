#![cfg(test)]

// Property tests for ProbeTable kept inside the crate so they can check
// slot-level invariants through `assert_invariants`.

use crate::behavior::{FnBehavior, HashedBehavior, TableBehavior};
use crate::config::TableConfig;
use crate::probe_table::ProbeTable;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Listing,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Listing),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Smallest initial * factor^k that keeps `len` entries at or under the threshold.
fn expected_capacity(config: &TableConfig, len: usize) -> usize {
    let mut capacity = config.initial_capacity();
    while len as f64 / capacity as f64 > config.load_threshold() {
        capacity *= config.resize_factor();
    }
    capacity
}

// State-machine run against std::collections::HashMap. After every op:
// - structural invariants (no duplicates, reachability from the home slot, size) hold;
// - len parity with the model;
// - capacity is the smallest admissible growth step for the current len;
// - counters never decrease.
fn run_against_model<B>(
    mut sut: ProbeTable<String, i32, B>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    B: TableBehavior<String, i32>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let config = *sut.config();
    let (mut collisions, mut rehashes) = (0, 0);

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v).expect("growth within small bounds");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Listing => {
                let keys = sut.keys();
                let values = sut.values();
                prop_assert_eq!(keys.len(), sut.len());
                prop_assert_eq!(values.len(), sut.len());
                for (k, v) in keys.iter().zip(values.iter()) {
                    prop_assert_eq!(sut.get(k), Some(*v));
                }
                let listed: BTreeMap<String, i32> = sut
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect();
                let expected: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(listed, expected);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.capacity(), expected_capacity(&config, sut.len()));
        prop_assert!(sut.collisions() >= collisions);
        prop_assert!(sut.rehashes() >= rehashes);
        collisions = sut.collisions();
        rehashes = sut.rehashes();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: ProbeTable<String, i32> = ProbeTable::new();
        run_against_model(sut, &pool, ops)?;
    }
}

// Worst case: every key shares one home slot, the table starts at a single
// slot and grows threefold. Every lookup walks the whole cluster.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let behavior = FnBehavior::new(
            |_: &String| 0,
            |a, b| a == b,
            |k, v: &i32, out| write!(out, "{k}={v}"),
        );
        let config = TableConfig::new().with_initial_capacity(1).with_resize_factor(3);
        let sut = ProbeTable::with_config(behavior, config).expect("valid config");
        run_against_model(sut, &pool, ops)?;
    }
}

// Explicit hasher seeds change slot placement but never observable contents.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_hasher_choice_is_unobservable(
        (pool, ops) in arb_scenario(),
        threshold in 0.3f64..0.95,
    ) {
        let behavior = HashedBehavior::with_hasher(std::collections::hash_map::RandomState::new());
        let config = TableConfig::new().with_load_threshold(threshold);
        let sut = ProbeTable::with_config(behavior, config).expect("valid config");
        run_against_model(sut, &pool, ops)?;
    }
}
