#![cfg(test)]

// Property tests for DualIndexMap kept inside the crate so they can check the
// chain invariants of the entry store after every step.

use crate::dual_index_map::DualIndexMap;
use crate::error::Error;
use crate::iter::{Cursor, Direction};
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;

// Folds every written byte into two bits: at most four distinct hashes, so
// chains are long and unrelated keys and values collide constantly.
#[derive(Clone, Default)]
struct TwoBitBuildHasher;
struct TwoBitHasher(u64);
impl BuildHasher for TwoBitBuildHasher {
    type Hasher = TwoBitHasher;
    fn build_hasher(&self) -> Self::Hasher {
        TwoBitHasher(0)
    }
}
impl Hasher for TwoBitHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_add(*b as u64);
        }
    }
    fn finish(&self) -> u64 {
        self.0 & 3
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(i32, u8),
    Append(u8),
    RemoveAt(i32),
    ShiftRemoveAt(i32),
    Remove(u8),
    ShiftRemove(u8),
    Get(i32),
    ValueQuery(u8),
    EnsureCapacity(usize),
    Clear,
    StartCursor(bool),
    StepCursor,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let key = 0i32..12;
    let value = 0u8..6;
    let op = prop_oneof![
        4 => (key.clone(), value.clone()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => value.clone().prop_map(Op::Append),
        2 => key.clone().prop_map(Op::RemoveAt),
        1 => key.clone().prop_map(Op::ShiftRemoveAt),
        1 => value.clone().prop_map(Op::Remove),
        1 => value.clone().prop_map(Op::ShiftRemove),
        2 => key.prop_map(Op::Get),
        2 => value.prop_map(Op::ValueQuery),
        1 => (0usize..40).prop_map(Op::EnsureCapacity),
        1 => Just(Op::Clear),
        1 => any::<bool>().prop_map(Op::StartCursor),
        3 => Just(Op::StepCursor),
    ];
    proptest::collection::vec(op, 1..120)
}

// Scan in progress: the model as it was when the cursor started, plus the
// positions still to visit.
struct Scan {
    cursor: Cursor,
    snapshot: Vec<(i32, u8)>,
    order: Vec<usize>,
    failed: bool,
}

// State-machine equivalence against a positional `Vec<(K, V)>` model.
// Invariants exercised across random operation sequences:
// - iteration order equals the model after every insert/append/remove;
// - swap removal moves the last entry into the hole, shift removal preserves order;
// - value queries only report keys whose value is equal, even under collisions;
// - the generation changes exactly when the map is structurally mutated;
// - a cursor yields the snapshot until a mutation, then fails once and ends;
// - both chains stay consistent (checked via `assert_invariants`).
fn run<S: BuildHasher>(mut sut: DualIndexMap<i32, u8, S>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: Vec<(i32, u8)> = Vec::new();
    let mut last_key: Option<i32> = None;
    let mut scan: Option<Scan> = None;

    for op in ops {
        let before = sut.generation();
        let mutated = match op {
            Op::Insert(k, v) => {
                let prev = sut.insert(k, v).expect("insert");
                match model.iter_mut().find(|(mk, _)| *mk == k) {
                    Some(slot) => {
                        prop_assert_eq!(prev, Some(slot.1));
                        slot.1 = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.push((k, v));
                    }
                }
                true
            }
            Op::Append(v) => {
                let k = sut.append(v).expect("append");
                let mut expected = last_key.map_or(0, |l| l + 1);
                while model.iter().any(|(mk, _)| *mk == expected) {
                    expected += 1;
                }
                prop_assert_eq!(k, expected);
                last_key = Some(k);
                model.push((k, v));
                true
            }
            Op::RemoveAt(k) => {
                let got = sut.remove_at(&k);
                let pos = model.iter().position(|(mk, _)| *mk == k);
                prop_assert_eq!(got, pos.map(|p| model.swap_remove(p)));
                got.is_some()
            }
            Op::ShiftRemoveAt(k) => {
                let got = sut.shift_remove_at(&k);
                let pos = model.iter().position(|(mk, _)| *mk == k);
                prop_assert_eq!(got, pos.map(|p| model.remove(p)));
                got.is_some()
            }
            Op::Remove(v) | Op::ShiftRemove(v) => {
                let shift = matches!(op, Op::ShiftRemove(_));
                let got = if shift { sut.shift_remove(&v) } else { sut.remove(&v) };
                match got {
                    Some((k, gv)) => {
                        prop_assert_eq!(gv, v);
                        let p = model.iter().position(|&(mk, mv)| mk == k && mv == v);
                        prop_assert!(p.is_some(), "removed pair not in model");
                        if let Some(p) = p {
                            if shift {
                                model.remove(p);
                            } else {
                                model.swap_remove(p);
                            }
                        }
                        true
                    }
                    None => {
                        prop_assert!(model.iter().all(|&(_, mv)| mv != v));
                        false
                    }
                }
            }
            Op::Get(k) => {
                let expected = model.iter().find(|(mk, _)| *mk == k).map(|(_, v)| v);
                prop_assert_eq!(sut.get(&k), expected);
                prop_assert_eq!(sut.try_get(&k).ok(), expected);
                if expected.is_none() {
                    prop_assert_eq!(sut.try_get(&k), Err(Error::KeyNotFound));
                }
                prop_assert_eq!(sut.get_index_of(&k), model.iter().position(|(mk, _)| *mk == k));
                false
            }
            Op::ValueQuery(v) => {
                let holders: Vec<i32> = model.iter().filter(|&&(_, mv)| mv == v).map(|&(k, _)| k).collect();
                prop_assert_eq!(sut.contains_value(&v), !holders.is_empty());
                let first = sut.index_of(&v).copied();
                let last = sut.last_index_of(&v).copied();
                prop_assert_eq!(first.is_some(), !holders.is_empty());
                prop_assert_eq!(last.is_some(), !holders.is_empty());
                for k in first.iter().chain(last.iter()) {
                    prop_assert!(holders.contains(k));
                    prop_assert_eq!(sut.get(k), Some(&v));
                }
                if holders.len() == 1 {
                    prop_assert_eq!(first, last);
                }
                false
            }
            Op::EnsureCapacity(n) => {
                sut.ensure_capacity(n).expect("ensure_capacity");
                prop_assert!(sut.capacity() >= n);
                false
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                last_key = None;
                true
            }
            Op::StartCursor(forward) => {
                let dir = if forward { Direction::Forward } else { Direction::Backward };
                let mut order: Vec<usize> = (0..model.len()).collect();
                if forward {
                    order.reverse();
                }
                scan = Some(Scan {
                    cursor: sut.cursor(dir),
                    snapshot: model.clone(),
                    order,
                    failed: false,
                });
                false
            }
            Op::StepCursor => {
                if let Some(s) = scan.as_mut() {
                    let step = s.cursor.next_pair(&sut).map(|r| r.map(|(k, v)| (*k, *v)));
                    if s.failed {
                        prop_assert!(step.is_none());
                    } else if s.snapshot != model {
                        let aborted = matches!(step, Some(Err(Error::ConcurrentModification { .. })));
                        prop_assert!(aborted, "expected ConcurrentModification, got {:?}", step);
                        s.failed = true;
                    } else {
                        let expected = s.order.pop().map(|i| Ok(s.snapshot[i]));
                        prop_assert_eq!(step, expected);
                    }
                }
                false
            }
        };

        prop_assert_eq!(sut.generation() != before, mutated, "generation after {:?}", op);
        if mutated {
            if let Some(s) = scan.as_mut() {
                // Any structural change fails the scan, even one that restores
                // the same contents.
                s.snapshot.clear();
                s.snapshot.push((i32::MIN, 0));
            }
        }
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        let pairs: Vec<(i32, u8)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(&pairs, &model);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine_default_hasher(ops in arb_ops()) {
        run(DualIndexMap::new(), ops)?;
    }

    #[test]
    fn prop_state_machine_colliding_hasher(ops in arb_ops()) {
        run(DualIndexMap::with_hasher(TwoBitBuildHasher), ops)?;
    }
}
