// ProbeTable integration tests.
//
// Each test documents the behavior it verifies. Invariants exercised:
// - Round trip: a stored pair is returned by get/contains_key until
//   overwritten.
// - Update: a second put with the same key keeps len and returns the first
//   value.
// - Growth: capacity doubles exactly when size/capacity exceeds 0.75, and
//   every entry survives the rehash.
// - Destruction: delete runs once per live entry, never for overwritten
//   values.
// - Directory usage: string handles as keys, records with an adjacency list
//   as values, looked up and mutated in place.
use probe_table::{
    BehaviorBuilder, FnBehavior, ProbeTable, TableBehavior, TableConfig, TableError,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// Polynomial string hash with multiplier 31.
fn handle_hash(handle: &String) -> u64 {
    handle
        .bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

// Test: the concrete growth scenario.
// Assumes: default config (8 slots, 0.75 threshold, factor 2).
// Verifies: six keys stay in 8 slots, the seventh grows the table to 16 and
// all seven remain retrievable.
#[test]
fn seven_keys_grow_eight_slots_to_sixteen() {
    let mut t: ProbeTable<String, usize> = ProbeTable::new();
    let keys: Vec<String> = (0..7).map(|i| format!("key{i}")).collect();

    for (i, k) in keys.iter().take(6).enumerate() {
        assert_eq!(t.put(k.clone(), i).unwrap(), None);
    }
    assert_eq!(t.capacity(), 8);
    assert_eq!(t.len(), 6);

    t.put(keys[6].clone(), 6).unwrap();
    assert_eq!(t.capacity(), 16);
    assert_eq!(t.len(), 7);
    assert_eq!(t.rehashes(), 7);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.get(k), Some(&i));
        assert!(t.contains_key(k));
    }
}

// Test: update semantics.
// Verifies: len unchanged, previous value returned, new value visible.
#[test]
fn second_put_returns_previous_value() {
    let mut t: ProbeTable<String, &str> = ProbeTable::new();
    assert_eq!(t.put("k".to_string(), "first").unwrap(), None);
    assert_eq!(t.put("k".to_string(), "second").unwrap(), Some("first"));
    assert_eq!(t.len(), 1);
    assert_eq!(t.get(&"k".to_string()), Some(&"second"));
}

// Test: misses never error.
// Verifies: get/contains_key report absence on an empty and a populated
// table.
#[test]
fn lookups_miss_cleanly() {
    let mut t: ProbeTable<u32, u32> = ProbeTable::new();
    assert_eq!(t.get(&1), None);
    assert!(!t.contains_key(&1));
    for k in 0..100 {
        t.put(k, k).unwrap();
    }
    assert_eq!(t.get(&1000), None);
    assert!(!t.contains_key(&1000));
}

// Test: completeness across many rehashes.
// Verifies: after each insert, every previously inserted key still maps to
// its value; capacity follows 8 * 2^k.
#[test]
fn entries_survive_repeated_growth() {
    let mut t: ProbeTable<u64, u64> = ProbeTable::new();
    for k in 0..500u64 {
        t.put(k, k * k).unwrap();
        assert!(t.len() as f64 / t.capacity() as f64 <= 0.75);
        assert!(t.capacity().is_power_of_two() && t.capacity() >= 8);
    }
    for k in 0..500u64 {
        assert_eq!(t.get(&k), Some(&(k * k)));
    }
    assert_eq!(t.capacity(), 1024);
}

// Test: keys/values symmetry.
// Verifies: equal lengths and get(keys[i]) == values[i].
#[test]
fn keys_and_values_line_up() {
    let mut t: ProbeTable<String, usize> = ProbeTable::new();
    for i in 0..40 {
        t.put(format!("n{i}"), i).unwrap();
    }
    let keys = t.keys();
    let values = t.values();
    assert_eq!(keys.len(), t.len());
    assert_eq!(values.len(), t.len());
    for (k, v) in keys.iter().zip(values.iter()) {
        assert_eq!(t.get(k), Some(*v));
    }
}

// Test: a behavior without required callbacks never yields a table.
// Verifies: BehaviorBuilder::build reports the first missing callback.
#[test]
fn incomplete_behavior_is_rejected() {
    let res = BehaviorBuilder::<String, u32>::new()
        .hash(handle_hash)
        .print(|k, v, out| write!(out, "{k}: {v}"))
        .build();
    match res {
        Err(TableError::MissingBehavior(name)) => assert_eq!(name, "equals"),
        Ok(_) => panic!("expected a missing equals callback to be rejected"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

// Test: destruction completeness.
// Assumes: delete is supplied.
// Verifies: delete runs exactly once per live key with its current value;
// overwritten values are dropped by put's caller, not deleted.
#[test]
fn destroy_visits_every_live_entry_once() {
    let deleted: Rc<RefCell<Vec<(String, u32)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&deleted);
    let behavior = BehaviorBuilder::new()
        .hash(handle_hash)
        .equals(|a, b| a == b)
        .print(|k, v: &u32, out| write!(out, "{k}: {v}"))
        .delete(move |k, v| sink.borrow_mut().push((k, v)))
        .build()
        .expect("complete behavior");

    let mut t = ProbeTable::with_behavior(behavior);
    for i in 0..30u32 {
        t.put(format!("h{i}"), i).unwrap();
    }
    let overwritten = t.put("h3".to_string(), 300).unwrap();
    assert_eq!(overwritten, Some(3));
    t.destroy();

    let mut seen = deleted.borrow().clone();
    assert_eq!(seen.len(), 30);
    seen.sort();
    let mut expected: Vec<(String, u32)> = (0..30u32)
        .map(|i| (format!("h{i}"), if i == 3 { 300 } else { i }))
        .collect();
    expected.sort();
    assert_eq!(seen, expected);
}

// Test: destruction without a delete callback.
// Verifies: values are simply dropped (shared records lose one strong count).
#[test]
fn destroy_without_delete_drops_entries() {
    let record = Rc::new("shared".to_string());
    let mut t: ProbeTable<u8, Rc<String>> = ProbeTable::new();
    for k in 0..5u8 {
        t.put(k, Rc::clone(&record)).unwrap();
    }
    assert_eq!(Rc::strong_count(&record), 6);
    t.destroy();
    assert_eq!(Rc::strong_count(&record), 1);
}

// Test: dump through a custom print callback.
// Verifies: summary line and one "Bucket i:" line per occupied slot.
#[test]
fn dump_uses_print_callback() {
    let behavior = FnBehavior::new(
        |k: &u32| u64::from(*k),
        |a, b| a == b,
        |k, v: &&str, out| write!(out, "Person: {k} ({v})"),
    );
    let config = TableConfig::new().with_initial_capacity(4);
    let mut t = ProbeTable::with_config(behavior, config).unwrap();
    t.put(2, "ann").unwrap();
    t.put(6, "bob").unwrap(); // home 2, lands in 3

    let mut out = String::new();
    t.dump(true, &mut out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Hash Table Information:",
            "Size: 2, Capacity: 4, Collisions: 0, Rehashes: 0",
            "Hash Table Contents:",
            "Bucket 2: Person: 2 (ann)",
            "Bucket 3: Person: 6 (bob)",
        ]
    );
}

// ---- Directory usage: records keyed by handle with an adjacency list ----

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    handle: String,
    friends: Vec<String>,
}

impl Person {
    fn new(name: &str, handle: &str) -> Self {
        Self {
            name: name.to_string(),
            handle: handle.to_string(),
            friends: Vec::new(),
        }
    }
}

struct DirectoryBehavior {
    released: Rc<RefCell<Vec<String>>>,
}

impl TableBehavior<String, Person> for DirectoryBehavior {
    fn hash(&self, key: &String) -> u64 {
        handle_hash(key)
    }

    fn equals(&self, a: &String, b: &String) -> bool {
        a == b
    }

    fn print(&self, key: &String, value: &Person, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(
            out,
            "{key} ({}) has {} friends",
            value.name,
            value.friends.len()
        )
    }

    fn delete(&self, key: String, value: Person) {
        assert_eq!(key, value.handle);
        self.released.borrow_mut().push(key);
    }
}

type Directory = ProbeTable<String, Person, DirectoryBehavior>;

fn befriend(dir: &mut Directory, a: &str, b: &str) -> bool {
    let (a, b) = (a.to_string(), b.to_string());
    if a == b || !dir.contains_key(&a) || !dir.contains_key(&b) {
        return false;
    }
    let already = dir.get(&a).map_or(false, |p| p.friends.contains(&b));
    if already {
        return false;
    }
    if let Some(p) = dir.get_mut(&a) {
        p.friends.push(b.clone());
    }
    if let Some(p) = dir.get_mut(&b) {
        p.friends.push(a);
    }
    true
}

fn unfriend(dir: &mut Directory, a: &str, b: &str) -> bool {
    let (a, b) = (a.to_string(), b.to_string());
    let linked = dir.get(&a).map_or(false, |p| p.friends.contains(&b))
        && dir.get(&b).map_or(false, |p| p.friends.contains(&a));
    if !linked {
        return false;
    }
    if let Some(p) = dir.get_mut(&a) {
        p.friends.retain(|f| *f != b);
    }
    if let Some(p) = dir.get_mut(&b) {
        p.friends.retain(|f| *f != a);
    }
    true
}

// Test: the table as a directory backend.
// Verifies: lookups before mutation, in-place adjacency edits through
// get_mut, growth while records hold friend lists, dump output and release
// of every record at shutdown.
#[test]
fn directory_of_people_with_friendships() {
    let released = Rc::new(RefCell::new(Vec::new()));
    let mut dir: Directory = ProbeTable::with_behavior(DirectoryBehavior {
        released: Rc::clone(&released),
    });

    let people = [
        ("John Doe", "john123"),
        ("Alice Smith", "alice"),
        ("Bob Stone", "bob"),
        ("Carol King", "carol"),
        ("Dan Brown", "dan"),
        ("Eve Adams", "eve"),
        ("Frank Moss", "frank"),
        ("Grace Hill", "grace"),
    ];
    for (name, handle) in people {
        let prev = dir.put(handle.to_string(), Person::new(name, handle)).unwrap();
        assert!(prev.is_none());
    }
    assert_eq!(dir.len(), 8);
    assert_eq!(dir.capacity(), 16);

    assert!(befriend(&mut dir, "john123", "alice"));
    assert!(befriend(&mut dir, "john123", "bob"));
    assert!(befriend(&mut dir, "alice", "grace"));
    assert!(!befriend(&mut dir, "john123", "alice"), "already friends");
    assert!(!befriend(&mut dir, "john123", "nobody"), "unknown handle");
    assert!(!befriend(&mut dir, "eve", "eve"), "self friendship");

    let john = dir.get(&"john123".to_string()).expect("john present");
    assert_eq!(john.friends, vec!["alice".to_string(), "bob".to_string()]);

    assert!(unfriend(&mut dir, "john123", "alice"));
    assert!(!unfriend(&mut dir, "john123", "alice"), "no longer friends");
    assert_eq!(
        dir.get(&"alice".to_string()).map(|p| p.friends.clone()),
        Some(vec!["grace".to_string()])
    );

    let mut out = String::new();
    dir.dump(true, &mut out).unwrap();
    assert!(out.starts_with("Hash Table Information:\nSize: 8, Capacity: 16,"));
    assert!(out.contains("john123 (John Doe) has 1 friends"));
    assert!(out.contains("alice (Alice Smith) has 1 friends"));
    assert_eq!(out.matches("Bucket ").count(), 8);

    dir.destroy();
    let mut gone = released.borrow().clone();
    gone.sort();
    let mut expected: Vec<String> = people.iter().map(|(_, h)| h.to_string()).collect();
    expected.sort();
    assert_eq!(gone, expected);
}
