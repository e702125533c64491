//! Property-based tests for the bounded cache and key canonicalization.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use decorum_core::{BoundedCache, CacheKey, Cached, Canonicalize};

// == Reference model ==
/// Plain LRU over a deque, most recently used at the front.
struct ModelLru {
    capacity: usize,
    order: VecDeque<i64>,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
        }
    }

    /// Returns true on a hit.
    fn call(&mut self, arg: i64) -> bool {
        if let Some(pos) = self.order.iter().position(|&k| k == arg) {
            self.order.remove(pos);
            self.order.push_front(arg);
            return true;
        }
        self.order.push_front(arg);
        if self.order.len() > self.capacity {
            self.order.pop_back();
        }
        false
    }
}

// == Strategies ==
fn call_sequence() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0_i64..12, 0..200)
}

fn arg_strategy() -> impl Strategy<Value = (i64, String, Vec<bool>)> {
    (any::<i64>(), "[a-z]{0,8}", prop::collection::vec(any::<bool>(), 0..4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_matches_reference_lru(capacity in 1_usize..8, calls in call_sequence()) {
        let mut model = ModelLru::new(capacity);
        let mut computed = 0_u64;
        let mut cache = BoundedCache::new(capacity).unwrap();

        for arg in calls {
            let expected_hit = model.call(arg);
            let before = computed;
            let value = cache.get_or_compute(arg.canonicalize().unwrap(), || {
                computed += 1;
                arg * 3
            });

            prop_assert_eq!(value, arg * 3);
            prop_assert_eq!(computed == before, expected_hit);
            prop_assert!(cache.len() <= capacity);

            let keys: Vec<CacheKey> = cache.keys().cloned().collect();
            let model_keys: Vec<CacheKey> = model
                .order
                .iter()
                .map(|k| k.canonicalize().unwrap())
                .collect();
            prop_assert_eq!(keys, model_keys);
        }
    }

    #[test]
    fn prop_stats_account_for_every_call(capacity in 1_usize..6, calls in call_sequence()) {
        let mut cache = BoundedCache::new(capacity).unwrap();
        for &arg in &calls {
            cache.get_or_compute(arg.canonicalize().unwrap(), || arg);
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.total_accesses(), calls.len() as u64);
        prop_assert_eq!(stats.misses() - stats.evictions(), cache.len() as u64);
    }

    #[test]
    fn prop_canonicalization_is_deterministic(arg in arg_strategy()) {
        let first = arg.canonicalize().unwrap();
        let second = arg.clone().canonicalize().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_map_key_ignores_insertion_order(
        entries in prop::collection::btree_map("[a-z]{1,4}", any::<i32>(), 0..10)
    ) {
        let forward: HashMap<String, i32> = entries.clone().into_iter().collect();
        let mut reversed = HashMap::new();
        for (k, v) in entries.iter().rev() {
            reversed.insert(k.clone(), *v);
        }
        let ordered: BTreeMap<String, i32> = entries;

        let key = forward.canonicalize().unwrap();
        prop_assert_eq!(&key, &reversed.canonicalize().unwrap());
        prop_assert_eq!(&key, &ordered.canonicalize().unwrap());
    }

    #[test]
    fn prop_set_and_sequence_keys_differ(items in prop::collection::vec(0_i32..100, 1..10)) {
        let as_seq = items.canonicalize().unwrap();
        let as_set: HashSet<i32> = items.iter().copied().collect();
        prop_assert_ne!(as_seq, as_set.canonicalize().unwrap());
    }

    #[test]
    fn prop_cached_wrapper_returns_function_result(calls in call_sequence()) {
        let mut cached = Cached::new(|n: i64| n * n - 1, 4).unwrap();
        for arg in calls {
            prop_assert_eq!(cached.call(arg), Ok(arg * arg - 1));
        }
    }
}
