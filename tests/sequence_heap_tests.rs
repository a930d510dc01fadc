//! Behavioral tests for the public queue surface
//!
//! Scenario-level coverage: ordering on concrete inputs, the flush boundary
//! of the insertion buffer, contract violations, capacity exhaustion, and
//! configuration validation.

use sequence_heap::{Config, SequenceHeap};

#[test]
fn test_six_element_scenario() {
    let mut heap: SequenceHeap<i64, i64> = SequenceHeap::new();
    for &k in &[5, 3, 8, 1, 9, 2] {
        heap.insert(k, -k);
    }
    assert_eq!(heap.len(), 6);

    let drained: Vec<(i64, i64)> = (0..6).map(|_| heap.delete_min()).collect();
    assert_eq!(
        drained,
        vec![(1, -1), (2, -2), (3, -3), (5, -5), (8, -8), (9, -9)]
    );
    assert_eq!(heap.len(), 0);
    assert!(heap.is_empty());
}

#[test]
fn test_ties_surface_all_values() {
    let mut heap: SequenceHeap<i32, &str> = SequenceHeap::new();
    heap.insert(4, "a");
    heap.insert(4, "b");
    heap.insert(4, "c");

    let mut values: Vec<&str> = (0..3)
        .map(|_| {
            let (k, v) = heap.delete_min();
            assert_eq!(k, 4);
            v
        })
        .collect();
    values.sort_unstable();
    assert_eq!(values, vec!["a", "b", "c"]);
}

#[test]
fn test_flush_happens_exactly_at_bandwidth() {
    let config = Config {
        insertion_bandwidth: 16,
        level_bandwidth: 8,
        max_arity: 4,
        levels: 2,
    };
    let mut heap: SequenceHeap<u32, u32> = SequenceHeap::with_config(config);

    // exactly bandwidth inserts: still buffered, nothing observable changes
    for k in 1..=16 {
        heap.insert(k, k);
    }
    assert_eq!(heap.len(), 16);

    // the next insert forces one flush; counts and order must be unaffected
    heap.insert(17, 17);
    assert_eq!(heap.len(), 17);
    for k in 1..=17 {
        assert_eq!(heap.delete_min(), (k, k));
    }
}

#[test]
fn test_peek_is_nondestructive() {
    let mut heap: SequenceHeap<i32, i32> = SequenceHeap::new();
    heap.insert(2, 20);
    heap.insert(1, 10);
    for _ in 0..5 {
        assert_eq!(heap.peek_min(), (&1, &10));
        assert_eq!(heap.len(), 2);
    }
    assert_eq!(heap.delete_min(), (1, 10));
    assert_eq!(heap.peek_min(), (&2, &20));
}

#[test]
fn test_batch_larger_than_level_cache() {
    // a top-cache batch (up to 32) can be wider than a whole level cache;
    // the level must keep feeding its smallest elements for the full batch
    let config = Config {
        insertion_bandwidth: 4,
        level_bandwidth: 8,
        max_arity: 4,
        levels: 4,
    };
    let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(config);

    // twenty equal keys push sixteen of them a level down, then a single
    // larger key lands in front of four more equal ones
    for _ in 0..20 {
        heap.insert(0, 0);
    }
    heap.insert(1, 1);
    for _ in 0..4 {
        heap.insert(0, 0);
    }

    let drained: Vec<i32> = std::iter::from_fn(|| heap.pop().map(|(k, _)| k)).collect();
    let mut expected = vec![0; 24];
    expected.push(1);
    assert_eq!(drained, expected);
}

#[test]
fn test_pop_returns_none_when_empty() {
    let mut heap: SequenceHeap<i32, i32> = SequenceHeap::new();
    assert_eq!(heap.pop(), None);
    heap.insert(1, 1);
    assert_eq!(heap.pop(), Some((1, 1)));
    assert_eq!(heap.pop(), None);
}

#[test]
#[should_panic(expected = "empty queue")]
fn test_peek_min_on_empty_panics() {
    let heap: SequenceHeap<i32, i32> = SequenceHeap::new();
    heap.peek_min();
}

#[test]
#[should_panic(expected = "empty queue")]
fn test_delete_min_on_empty_panics() {
    let mut heap: SequenceHeap<i32, i32> = SequenceHeap::new();
    heap.delete_min();
}

#[test]
#[should_panic(expected = "sentinel")]
fn test_infimum_key_rejected() {
    let mut heap: SequenceHeap<i64, ()> = SequenceHeap::new();
    heap.insert(i64::MIN, ());
}

#[test]
#[should_panic(expected = "sentinel")]
fn test_supremum_key_rejected() {
    let mut heap: SequenceHeap<u8, ()> = SequenceHeap::new();
    heap.insert(u8::MAX, ());
}

#[test]
#[should_panic(expected = "capacity exhausted")]
fn test_insert_panics_on_capacity_exhaustion() {
    let config = Config {
        insertion_bandwidth: 2,
        level_bandwidth: 2,
        max_arity: 2,
        levels: 1,
    };
    let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(config);
    for k in 0..1000 {
        heap.insert(k, k);
    }
}

#[test]
fn test_try_insert_reports_and_preserves() {
    let config = Config {
        insertion_bandwidth: 2,
        level_bandwidth: 2,
        max_arity: 2,
        levels: 1,
    };
    let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(config);
    let mut accepted = Vec::new();
    for k in 0..1000 {
        match heap.try_insert(k, k) {
            Ok(()) => accepted.push(k),
            Err(_) => break,
        }
    }
    assert!(accepted.len() < 1000, "undersized config should fill up");
    assert_eq!(heap.len(), accepted.len());

    // everything accepted before the failure drains intact and in order
    let drained: Vec<i32> = std::iter::from_fn(|| heap.pop().map(|(k, _)| k)).collect();
    assert_eq!(drained, accepted);
}

#[test]
#[should_panic(expected = "power of two")]
fn test_invalid_arity_rejected() {
    let config = Config {
        max_arity: 3,
        ..Config::default()
    };
    let _heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(config);
}

#[test]
fn test_capacity_hint_default() {
    // bandwidth 512 with arity 64 over 4 levels
    assert_eq!(Config::default().capacity_hint(), 512 * 64usize.pow(4));
}

#[test]
fn test_values_need_only_clone_default() {
    #[derive(Clone, Default, Debug, PartialEq)]
    struct Payload {
        tag: String,
    }

    let mut heap: SequenceHeap<u32, Payload> = SequenceHeap::with_config(Config {
        insertion_bandwidth: 4,
        level_bandwidth: 8,
        max_arity: 4,
        levels: 2,
    });
    for k in (0..40).rev() {
        heap.insert(k + 1, Payload {
            tag: format!("item-{k}"),
        });
    }
    for k in 0..40 {
        let (key, payload) = heap.delete_min();
        assert_eq!(key, k + 1);
        assert_eq!(payload.tag, format!("item-{k}"));
    }
}
