use dual_index_map::{Direction, DualIndexMap, Error};

fn numbered(n: i32) -> DualIndexMap<i32, String> {
    let mut m = DualIndexMap::new();
    for i in 0..n {
        m.insert(i, format!("v{i}")).expect("insert ok");
    }
    m
}

#[test]
fn insert_ten_and_index() {
    let m = numbered(10);
    assert_eq!(m.len(), 10);
    assert_eq!(m[&5], "v5");
    assert_eq!(m.try_get(&5).map(String::as_str), Ok("v5"));
}

#[test]
fn remove_at_then_lookup() {
    let mut m = numbered(10);
    assert_eq!(m.remove_at(&5), Some((5, "v5".to_string())));
    assert_eq!(m.try_get(&5), Err(Error::KeyNotFound));
    assert_eq!(m.len(), 9);
    assert_eq!(m.try_get(&9).map(String::as_str), Ok("v9"));
    assert_eq!(m.remove_at(&5), None);
    assert_eq!(m.len(), 9);
}

#[test]
fn fifty_keys_through_small_initial_layout() {
    let mut m: DualIndexMap<i32, String> = DualIndexMap::with_capacity(3);
    assert_eq!(m.bucket_count(), 3);
    for i in 0..50 {
        m.insert(i, format!("v{i}")).unwrap();
    }
    assert!(m.bucket_count() > 3);
    for i in 0..50 {
        assert_eq!(m[&i], format!("v{i}"));
    }
    let keys: Vec<i32> = m.keys().copied().collect();
    assert_eq!(keys, (0..50).collect::<Vec<_>>());
}

#[test]
fn append_during_scan_fails_next_step() {
    let mut m: DualIndexMap<i32, String> = DualIndexMap::new();
    for i in 0..5 {
        m.append(format!("p{i}")).unwrap();
    }
    let mut c = m.cursor(Direction::Forward);
    assert_eq!(c.next_pair(&m).unwrap().unwrap(), (&0, &"p0".to_string()));
    assert_eq!(c.next_pair(&m).unwrap().unwrap(), (&1, &"p1".to_string()));
    assert_eq!(m.append("p5".to_string()), Ok(5));
    assert!(matches!(
        c.next_pair(&m),
        Some(Err(Error::ConcurrentModification { .. }))
    ));
}

#[test]
fn value_lookup_symmetry() {
    let mut m: DualIndexMap<u32, &str> = DualIndexMap::new();
    for (k, v) in [(10, "a"), (11, "b"), (12, "a"), (13, "c")] {
        m.insert(k, v).unwrap();
    }
    for v in ["a", "b", "c"] {
        assert!(m.contains_value(&v));
        let k = m.index_of(&v).copied().expect("present value has a key");
        assert_eq!(m[&k], v);
        let k = m.last_index_of(&v).copied().expect("present value has a key");
        assert_eq!(m[&k], v);
    }
    assert_eq!(m.index_of(&"a"), Some(&10));
    assert_eq!(m.last_index_of(&"a"), Some(&12));
    assert!(!m.contains_value(&"z"));
    assert_eq!(m.index_of(&"z"), None);
    assert_eq!(m.last_index_of(&"z"), None);
}

#[test]
fn overwrite_moves_value_index() {
    let mut m: DualIndexMap<u32, String> = DualIndexMap::new();
    m.insert(1, "old".to_string()).unwrap();
    m.insert(2, "other".to_string()).unwrap();
    assert_eq!(m.insert(1, "new".to_string()), Ok(Some("old".to_string())));
    assert!(!m.contains_value("old"));
    assert_eq!(m.index_of("new"), Some(&1));
    assert_eq!(m.remove("new"), Some((1, "new".to_string())));
    assert_eq!(m.len(), 1);
}

#[test]
fn shift_removal_keeps_insertion_order() {
    let mut m = numbered(6);
    assert_eq!(m.shift_remove_at(&1), Some((1, "v1".to_string())));
    assert_eq!(m.shift_remove("v3"), Some((3, "v3".to_string())));
    let keys: Vec<i32> = m.keys().copied().collect();
    assert_eq!(keys, [0, 2, 4, 5]);
    for k in keys {
        assert_eq!(m[&k], format!("v{k}"));
        assert_eq!(m.index_of(format!("v{k}").as_str()), Some(&k));
    }
}

#[test]
fn clear_then_queries_match_fresh_map() {
    let mut m = numbered(12);
    m.clear();
    let fresh: DualIndexMap<i32, String> = DualIndexMap::new();
    assert_eq!(m.len(), fresh.len());
    assert_eq!(m.is_empty(), fresh.is_empty());
    assert_eq!(m.contains_value("v1"), fresh.contains_value("v1"));
    assert_eq!(m.iter().count(), 0);
    let mut c = m.cursor(Direction::Backward);
    assert!(c.next_key(&m).is_none());
    assert_eq!(m.append("again".to_string()), Ok(0));
}

#[test]
fn backward_iteration_views() {
    let m = numbered(3);
    let keys: Vec<i32> = m.keys().rev().copied().collect();
    assert_eq!(keys, [2, 1, 0]);
    let values: Vec<&String> = m.values().rev().collect();
    assert_eq!(values, ["v2", "v1", "v0"]);
    let pairs: Vec<(i32, String)> = m.into_iter().rev().collect();
    assert_eq!(pairs[0], (2, "v2".to_string()));
}

#[test]
fn capacity_errors_are_reported() {
    let mut m: DualIndexMap<u8, u8> = DualIndexMap::new();
    let err = m
        .ensure_capacity(dual_index_map::MAX_CAPACITY + 1)
        .unwrap_err();
    assert_eq!(
        err,
        Error::CapacityExceeded {
            requested: dual_index_map::MAX_CAPACITY + 1,
            max: dual_index_map::MAX_CAPACITY,
        }
    );
    assert_eq!(m.capacity(), dual_index_map::MIN_CAPACITY);
}
