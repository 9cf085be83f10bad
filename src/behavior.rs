//! Pluggable per-table behavior: hashing, key equality, printing and cleanup.
//!
//! `ProbeTable` never looks at keys or values itself; every decision goes
//! through a `TableBehavior`. Two implementations ship with the crate:
//! - `FnBehavior`: four caller-supplied closures, assembled directly or via
//!   `BehaviorBuilder` when the callbacks arrive one at a time.
//! - `HashedBehavior`: `Hash + Eq + Debug` keys hashed through a
//!   `BuildHasher`.

use crate::error::TableError;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Capability interface a table is parameterized over.
pub trait TableBehavior<K, V> {
    /// Hash a key. The table reduces the result modulo its capacity.
    fn hash(&self, key: &K) -> u64;

    /// Key equality. Must agree with `hash`: equal keys hash equally.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Render one entry for `ProbeTable::dump`.
    fn print(&self, key: &K, value: &V, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Release one entry when the table is destroyed.
    ///
    /// The default only drops the pair.
    fn delete(&self, key: K, value: V) {
        drop((key, value));
    }
}

pub type HashFn<K> = Box<dyn Fn(&K) -> u64>;
pub type EqualsFn<K> = Box<dyn Fn(&K, &K) -> bool>;
pub type PrintFn<K, V> = Box<dyn Fn(&K, &V, &mut dyn fmt::Write) -> fmt::Result>;
pub type DeleteFn<K, V> = Box<dyn Fn(K, V)>;

/// Behavior assembled from closures.
///
/// ```
/// use probe_table::{FnBehavior, ProbeTable};
///
/// let behavior = FnBehavior::new(
///     |k: &u32| u64::from(*k),
///     |a, b| a == b,
///     |k, v: &&str, out| write!(out, "{k}: {v}"),
/// );
/// let mut t = ProbeTable::with_behavior(behavior);
/// t.put(3, "three").unwrap();
/// assert_eq!(t.get(&3), Some(&"three"));
/// ```
pub struct FnBehavior<K, V> {
    hash: HashFn<K>,
    equals: EqualsFn<K>,
    print: PrintFn<K, V>,
    delete: Option<DeleteFn<K, V>>,
}

impl<K, V> FnBehavior<K, V> {
    pub fn new<H, E, P>(hash: H, equals: E, print: P) -> Self
    where
        H: Fn(&K) -> u64 + 'static,
        E: Fn(&K, &K) -> bool + 'static,
        P: Fn(&K, &V, &mut dyn fmt::Write) -> fmt::Result + 'static,
    {
        Self {
            hash: Box::new(hash),
            equals: Box::new(equals),
            print: Box::new(print),
            delete: None,
        }
    }

    /// Install a cleanup callback run once per entry on destruction.
    pub fn with_delete<D>(mut self, delete: D) -> Self
    where
        D: Fn(K, V) + 'static,
    {
        self.delete = Some(Box::new(delete));
        self
    }

    pub fn builder() -> BehaviorBuilder<K, V> {
        BehaviorBuilder::new()
    }

    pub fn has_delete(&self) -> bool {
        self.delete.is_some()
    }
}

impl<K, V> TableBehavior<K, V> for FnBehavior<K, V> {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }

    fn print(&self, key: &K, value: &V, out: &mut dyn fmt::Write) -> fmt::Result {
        (self.print)(key, value, out)
    }

    fn delete(&self, key: K, value: V) {
        match &self.delete {
            Some(delete) => delete(key, value),
            None => drop((key, value)),
        }
    }
}

impl<K, V> fmt::Debug for FnBehavior<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBehavior")
            .field("delete", &self.delete.is_some())
            .finish_non_exhaustive()
    }
}

/// Collects callbacks one at a time; `build` rejects a missing required one.
pub struct BehaviorBuilder<K, V> {
    hash: Option<HashFn<K>>,
    equals: Option<EqualsFn<K>>,
    print: Option<PrintFn<K, V>>,
    delete: Option<DeleteFn<K, V>>,
}

impl<K, V> BehaviorBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            hash: None,
            equals: None,
            print: None,
            delete: None,
        }
    }

    pub fn hash(mut self, f: impl Fn(&K) -> u64 + 'static) -> Self {
        self.hash = Some(Box::new(f));
        self
    }

    pub fn equals(mut self, f: impl Fn(&K, &K) -> bool + 'static) -> Self {
        self.equals = Some(Box::new(f));
        self
    }

    pub fn print(
        mut self,
        f: impl Fn(&K, &V, &mut dyn fmt::Write) -> fmt::Result + 'static,
    ) -> Self {
        self.print = Some(Box::new(f));
        self
    }

    pub fn delete(mut self, f: impl Fn(K, V) + 'static) -> Self {
        self.delete = Some(Box::new(f));
        self
    }

    /// Finish the behavior. `hash`, `equals` and `print` are required.
    pub fn build(self) -> Result<FnBehavior<K, V>, TableError> {
        let hash = self.hash.ok_or(TableError::MissingBehavior("hash"))?;
        let equals = self.equals.ok_or(TableError::MissingBehavior("equals"))?;
        let print = self.print.ok_or(TableError::MissingBehavior("print"))?;
        Ok(FnBehavior {
            hash,
            equals,
            print,
            delete: self.delete,
        })
    }
}

impl<K, V> Default for BehaviorBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavior for ordinary Rust keys: `BuildHasher` hashing, `==` equality and
/// `Debug` printing.
#[derive(Debug, Clone, Default)]
pub struct HashedBehavior<S = DefaultHashBuilder> {
    hasher: S,
}

impl HashedBehavior {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> HashedBehavior<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<K, V, S> TableBehavior<K, V> for HashedBehavior<S>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn print(&self, key: &K, value: &V, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{key:?} => {value:?}")
    }
}
